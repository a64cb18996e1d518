// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Framed TCP transport.
//!
//! One TCP connection, two halves: the write half lives behind an async
//! mutex and is held only for the duration of a single frame write; the
//! read half is owned by the reader task, which is the only place that
//! parses bytes off the socket.

use crate::error::TransportError;
use crate::frame::Frame;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::trace;

/// The write surface of an established connection.
pub(crate) struct Connection {
    writer: Mutex<OwnedWriteHalf>,
    peer: SocketAddr,
}

/// Open a TCP connection to the bridge.
pub(crate) async fn connect(
    host: &str,
    port: u16,
    connect_timeout: Duration,
) -> Result<(Connection, OwnedReadHalf), TransportError> {
    let stream = tokio::time::timeout(connect_timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| TransportError::ConnectTimeout)?
        .map_err(TransportError::Connect)?;

    stream.set_nodelay(true).ok();
    let peer = stream.peer_addr().map_err(TransportError::Connect)?;
    let (read_half, write_half) = stream.into_split();

    Ok((
        Connection {
            writer: Mutex::new(write_half),
            peer,
        },
        read_half,
    ))
}

impl Connection {
    /// Write one wire-encoded frame atomically.
    pub async fn send(&self, wire: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(wire).await?;
        writer.flush().await?;
        trace!(bytes = wire.len(), "frame sent");
        Ok(())
    }

    /// Half-close the connection; the reader observes EOF and exits.
    pub async fn shutdown(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

/// Read exactly one envelope off the stream.
///
/// A clean EOF at a frame boundary is [`TransportError::Closed`]; EOF
/// mid-frame is an I/O error. Zero-length and oversized frames are fatal.
pub(crate) async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_frame_size: usize,
) -> Result<Frame, TransportError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(TransportError::Closed),
        Err(e) => return Err(TransportError::Io(e)),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len == 0 {
        return Err(TransportError::EmptyFrame);
    }
    if len > max_frame_size {
        return Err(TransportError::FrameTooLarge {
            len,
            max: max_frame_size,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    trace!(bytes = len, "frame received");
    Frame::decode(&body)
}

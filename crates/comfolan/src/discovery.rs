// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge discovery over UDP broadcast.
//!
//! A single probe (`0a 00`, an empty `SearchGatewayRequest`) goes out on
//! UDP 56747; every bridge on the segment answers with a frame-less
//! `SearchGatewayResponse` carrying its address, UUID and version. Replies
//! are collected for a bounded window and deduplicated by UUID.

use crate::config::BRIDGE_PORT;
use crate::error::{Error, TransportError};
use crate::proto::DiscoveryOperation;
use crate::util::Uuid;
use prost::Message;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The on-wire discovery probe.
const DISCOVERY_PROBE: &[u8] = &[0x0a, 0x00];

/// One discovered bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBridge {
    /// The address the bridge reports for itself.
    pub host: String,
    pub uuid: Uuid,
    pub version: u32,
}

/// Discover bridges on the local network.
///
/// With `target` set, the probe goes unicast to that address and the
/// first reply wins; otherwise it broadcasts and collects replies for
/// the whole window.
pub async fn discover_bridges(
    target: Option<IpAddr>,
    timeout: Duration,
) -> Result<Vec<DiscoveredBridge>, Error> {
    match target {
        Some(addr) => discover_with(addr, BRIDGE_PORT, timeout, true).await,
        None => {
            discover_with(IpAddr::from([255, 255, 255, 255]), BRIDGE_PORT, timeout, false).await
        }
    }
}

/// Discovery with explicit destination, port, and early-exit behavior.
pub async fn discover_with(
    addr: IpAddr,
    port: u16,
    timeout: Duration,
    stop_at_first: bool,
) -> Result<Vec<DiscoveredBridge>, Error> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))
        .await
        .map_err(TransportError::Io)?;
    socket.set_broadcast(true).map_err(TransportError::Io)?;

    debug!(%addr, port, "sending discovery probe");
    socket
        .send_to(DISCOVERY_PROBE, (addr, port))
        .await
        .map_err(TransportError::Io)?;

    let deadline = Instant::now() + timeout;
    let mut bridges: Vec<DiscoveredBridge> = Vec::new();
    let mut buf = [0u8; 1500];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        let (len, peer) =
            match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
                Ok(Ok(received)) => received,
                Ok(Err(e)) => return Err(TransportError::Io(e).into()),
                Err(_) => break,
            };

        let data = &buf[..len];
        if data == DISCOVERY_PROBE {
            // Our own broadcast, or another client probing.
            continue;
        }

        let Some(bridge) = parse_reply(data) else {
            warn!(%peer, "undecodable discovery reply");
            continue;
        };

        debug!(host = %bridge.host, uuid = %crate::util::hex_encode(&bridge.uuid), "bridge found");
        if !bridges.iter().any(|b| b.uuid == bridge.uuid) {
            bridges.push(bridge);
        }
        if stop_at_first {
            break;
        }
    }

    Ok(bridges)
}

fn parse_reply(data: &[u8]) -> Option<DiscoveredBridge> {
    let operation = DiscoveryOperation::decode(data).ok()?;
    let response = operation.search_gateway_response?;

    let uuid_bytes = response.uuid.unwrap_or_default();
    if uuid_bytes.len() != 16 {
        return None;
    }
    let mut uuid = [0u8; 16];
    uuid.copy_from_slice(&uuid_bytes);

    Some(DiscoveredBridge {
        host: response.ipaddress.unwrap_or_default(),
        uuid,
        version: response.version.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::SearchGatewayResponse;

    fn reply_bytes(host: &str, uuid: Uuid, version: u32) -> Vec<u8> {
        DiscoveryOperation {
            search_gateway_request: None,
            search_gateway_response: Some(SearchGatewayResponse {
                ipaddress: Some(host.to_string()),
                uuid: Some(uuid.to_vec()),
                version: Some(version),
            }),
        }
        .encode_to_vec()
    }

    #[test]
    fn test_parse_reply() {
        let uuid = [0xab; 16];
        let bridge = parse_reply(&reply_bytes("192.168.1.20", uuid, 1)).unwrap();
        assert_eq!(bridge.host, "192.168.1.20");
        assert_eq!(bridge.uuid, uuid);
        assert_eq!(bridge.version, 1);
    }

    #[test]
    fn test_parse_reply_rejects_bad_uuid() {
        let mut msg = DiscoveryOperation {
            search_gateway_request: None,
            search_gateway_response: Some(SearchGatewayResponse {
                ipaddress: Some("10.0.0.1".into()),
                uuid: Some(vec![1, 2, 3]),
                version: Some(1),
            }),
        };
        assert!(parse_reply(&msg.encode_to_vec()).is_none());

        msg.search_gateway_response = None;
        assert!(parse_reply(&msg.encode_to_vec()).is_none());
        assert!(parse_reply(&[0xff, 0xff, 0xff]).is_none());
    }

    #[tokio::test]
    async fn test_discover_over_loopback() {
        // A fake bridge answering on loopback.
        let bridge_socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let bridge_port = bridge_socket.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (len, peer) = bridge_socket.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..len], DISCOVERY_PROBE);
            let reply = reply_bytes("127.0.0.1", [0x42; 16], 1);
            bridge_socket.send_to(&reply, peer).await.unwrap();
        });

        let bridges = discover_with(
            IpAddr::from([127, 0, 0, 1]),
            bridge_port,
            Duration::from_secs(2),
            true,
        )
        .await
        .unwrap();

        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].uuid, [0x42; 16]);
        assert_eq!(bridges[0].host, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_discover_deduplicates_by_uuid() {
        let bridge_socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let bridge_port = bridge_socket.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (_, peer) = bridge_socket.recv_from(&mut buf).await.unwrap();
            // Same bridge answering twice, plus a second distinct one.
            let first = reply_bytes("127.0.0.1", [0x42; 16], 1);
            let second = reply_bytes("127.0.0.2", [0x43; 16], 1);
            bridge_socket.send_to(&first, peer).await.unwrap();
            bridge_socket.send_to(&first, peer).await.unwrap();
            bridge_socket.send_to(&second, peer).await.unwrap();
        });

        let bridges = discover_with(
            IpAddr::from([127, 0, 0, 1]),
            bridge_port,
            Duration::from_millis(500),
            false,
        )
        .await
        .unwrap();

        assert_eq!(bridges.len(), 2);
    }
}

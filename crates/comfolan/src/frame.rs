// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outer envelope framing.
//!
//! Every TCP message is length-prefix framed:
//!
//! ```text
//! +----------------+----------+----------+---------------+-----------+---------+
//! | Length (4B BE) | Src UUID | Dst UUID | OpLen (2B BE) | Operation | Payload |
//! +----------------+----------+----------+---------------+-----------+---------+
//! ```
//!
//! The length covers everything after the length field itself. `Operation`
//! is a serialized [`GatewayOperation`]; `Payload` is the message selected
//! by its operation type.

use crate::error::TransportError;
use crate::proto::{GatewayOperation, OperationPayload, OperationType};
use crate::util::Uuid;
use prost::Message;

/// Length prefix size.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Fixed envelope header: src UUID + dst UUID + operation length.
pub const ENVELOPE_HEADER_SIZE: usize = 16 + 16 + 2;

/// Default ceiling for a single envelope (64 KiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// One decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub src: Uuid,
    pub dst: Uuid,
    pub op: GatewayOperation,
    pub payload: OperationPayload,
}

impl Frame {
    /// Build an outbound request envelope.
    pub fn request(
        src: Uuid,
        dst: Uuid,
        op: OperationType,
        reference: u32,
        payload: OperationPayload,
    ) -> Self {
        Self {
            src,
            dst,
            op: GatewayOperation::request(op, reference),
            payload,
        }
    }

    /// The reference identifier, 0 meaning "no reference".
    pub fn reference(&self) -> u32 {
        self.op.reference.unwrap_or(0)
    }

    /// Serialize to wire bytes, including the length prefix.
    pub fn encode(&self) -> Vec<u8> {
        let op_buf = self.op.encode_to_vec();
        let payload_buf = self.payload.encode_to_vec();
        let body_len = ENVELOPE_HEADER_SIZE + op_buf.len() + payload_buf.len();

        let mut wire = Vec::with_capacity(LEN_PREFIX_SIZE + body_len);
        wire.extend_from_slice(&(body_len as u32).to_be_bytes());
        wire.extend_from_slice(&self.src);
        wire.extend_from_slice(&self.dst);
        wire.extend_from_slice(&(op_buf.len() as u16).to_be_bytes());
        wire.extend_from_slice(&op_buf);
        wire.extend_from_slice(&payload_buf);
        wire
    }

    /// Decode an envelope body (the bytes after the length prefix).
    pub fn decode(body: &[u8]) -> Result<Self, TransportError> {
        if body.len() < ENVELOPE_HEADER_SIZE {
            return Err(TransportError::Malformed(format!(
                "envelope too short: {} bytes",
                body.len()
            )));
        }

        let mut src = [0u8; 16];
        let mut dst = [0u8; 16];
        src.copy_from_slice(&body[0..16]);
        dst.copy_from_slice(&body[16..32]);

        let op_len = u16::from_be_bytes([body[32], body[33]]) as usize;
        if ENVELOPE_HEADER_SIZE + op_len > body.len() {
            return Err(TransportError::Malformed(format!(
                "operation length {} exceeds envelope",
                op_len
            )));
        }

        let op_buf = &body[ENVELOPE_HEADER_SIZE..ENVELOPE_HEADER_SIZE + op_len];
        let payload_buf = &body[ENVELOPE_HEADER_SIZE + op_len..];

        let op = GatewayOperation::decode(op_buf)
            .map_err(|e| TransportError::Malformed(format!("operation header: {}", e)))?;

        let tag = op.r#type.unwrap_or(0);
        let payload = OperationPayload::decode(tag, payload_buf)
            .map_err(|e| TransportError::Malformed(format!("operation payload: {}", e)))?;

        Ok(Self { src, dst, op, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{CnRmiRequest, KeepAlive, StartSessionRequest};

    const LOCAL: Uuid = [0x11; 16];
    const BRIDGE: Uuid = [0x22; 16];

    #[test]
    fn test_encode_layout() {
        let frame = Frame::request(
            LOCAL,
            BRIDGE,
            OperationType::KeepAlive,
            7,
            OperationPayload::KeepAlive(KeepAlive {}),
        );
        let wire = frame.encode();

        // Length prefix covers everything after itself.
        let len = u32::from_be_bytes([wire[0], wire[1], wire[2], wire[3]]) as usize;
        assert_eq!(len, wire.len() - LEN_PREFIX_SIZE);

        // UUIDs are raw bytes in src/dst order.
        assert_eq!(&wire[4..20], &LOCAL);
        assert_eq!(&wire[20..36], &BRIDGE);

        // Operation length matches the header bytes that follow.
        let op_len = u16::from_be_bytes([wire[36], wire[37]]) as usize;
        assert_eq!(wire.len(), LEN_PREFIX_SIZE + ENVELOPE_HEADER_SIZE + op_len);
    }

    #[test]
    fn test_roundtrip() {
        let frame = Frame::request(
            LOCAL,
            BRIDGE,
            OperationType::CnRmiRequest,
            42,
            OperationPayload::CnRmiRequest(CnRmiRequest {
                node_id: Some(1),
                message: Some(vec![0x01, 0x01, 0x01, 0x10, 0x14]),
            }),
        );

        let wire = frame.encode();
        let back = Frame::decode(&wire[LEN_PREFIX_SIZE..]).unwrap();
        assert_eq!(back, frame);
        assert_eq!(back.reference(), 42);
    }

    #[test]
    fn test_roundtrip_reencodes_identically() {
        let frame = Frame::request(
            LOCAL,
            BRIDGE,
            OperationType::StartSessionRequest,
            1,
            OperationPayload::StartSessionRequest(StartSessionRequest {
                takeover: Some(true),
            }),
        );
        let wire = frame.encode();
        let rewire = Frame::decode(&wire[LEN_PREFIX_SIZE..]).unwrap().encode();
        assert_eq!(wire, rewire);
    }

    #[test]
    fn test_decode_too_short() {
        let err = Frame::decode(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn test_decode_op_len_out_of_bounds() {
        let mut body = vec![0u8; ENVELOPE_HEADER_SIZE];
        body[32] = 0xff;
        body[33] = 0xff;
        let err = Frame::decode(&body).unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn test_decode_unknown_operation_is_not_fatal() {
        // Tag 102 (factory reset) is not modeled; payload bytes must be
        // preserved as-is.
        let mut op = GatewayOperation::default();
        op.r#type = Some(102);
        let op_buf = op.encode_to_vec();

        let mut body = Vec::new();
        body.extend_from_slice(&LOCAL);
        body.extend_from_slice(&BRIDGE);
        body.extend_from_slice(&(op_buf.len() as u16).to_be_bytes());
        body.extend_from_slice(&op_buf);
        body.extend_from_slice(&[0xab, 0xcd]);

        let frame = Frame::decode(&body).unwrap();
        match frame.payload {
            OperationPayload::Unknown { tag, data } => {
                assert_eq!(tag, 102);
                assert_eq!(data, vec![0xab, 0xcd]);
            }
            other => panic!("expected Unknown payload, got {:?}", other),
        }
    }
}

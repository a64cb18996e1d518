// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for the protocol engine.
//!
//! Errors are split by blast radius: transport faults kill the connection,
//! session faults end the session, request faults are scoped to a single
//! in-flight operation, and decode faults on the PDO path are logged and
//! dropped without touching the session.

use crate::proto::{GatewayResult, OperationType};
use thiserror::Error;

/// Faults that are fatal to the TCP connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("connect timed out")]
    ConnectTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    Closed,

    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("zero-length frame")]
    EmptyFrame,

    #[error("malformed envelope: {0}")]
    Malformed(String),
}

/// Faults that end the session but may be survivable by reconnecting.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("app is not registered with the bridge")]
    NotRegistered,

    #[error("session closed by the bridge")]
    ClosedByBridge,

    #[error("another app holds the session (retry with takeover)")]
    OtherSession,

    #[error("not connected")]
    NotConnected,

    #[error("no inbound traffic; connection stalled")]
    StalledConnection,

    #[error("protocol fault: {0}")]
    Protocol(String),
}

/// Faults scoped to a single request; the session continues.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("timed out waiting for reply")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    #[error("unexpected reply: expected {expected:?}, got {got:?}")]
    UnexpectedReply {
        expected: OperationType,
        got: Option<OperationType>,
    },

    #[error("connection lost while waiting for reply")]
    TransportLost,

    #[error("session closed while waiting for reply")]
    SessionClosed,

    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Non-OK result code attached to a reply by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("bad request")]
    BadRequest,

    #[error("internal error in the bridge")]
    InternalError,

    #[error("backend cannot route the request")]
    NotReachable,

    #[error("another session is active")]
    OtherSession,

    #[error("request not allowed")]
    NotAllowed,

    #[error("bridge is out of resources")]
    NoResources,

    #[error("node or property does not exist")]
    NotExist,
}

impl GatewayError {
    /// Map a wire result code to an error, `None` for `Ok` and for
    /// `RmiError` (which carries its code in the RMI response payload).
    pub fn from_result(result: GatewayResult) -> Option<Self> {
        match result {
            GatewayResult::Ok | GatewayResult::RmiError => None,
            GatewayResult::BadRequest => Some(Self::BadRequest),
            GatewayResult::InternalError => Some(Self::InternalError),
            GatewayResult::NotReachable => Some(Self::NotReachable),
            GatewayResult::OtherSession => Some(Self::OtherSession),
            GatewayResult::NotAllowed => Some(Self::NotAllowed),
            GatewayResult::NoResources => Some(Self::NoResources),
            GatewayResult::NotExist => Some(Self::NotExist),
        }
    }
}

/// Numeric RMI failure reported by the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("RMI error {code}: {}", rmi_error_name(*.code))]
pub struct RmiError {
    pub code: u32,
}

impl RmiError {
    /// Symbolic name for the error code, `UNKNOWN` for undocumented ones.
    pub fn name(&self) -> &'static str {
        rmi_error_name(self.code)
    }
}

fn rmi_error_name(code: u32) -> &'static str {
    match code {
        11 => "UNKNOWN_CMD",
        12 => "UNKNOWN_UNIT",
        13 => "UNKNOWN_SUBUNIT",
        14 => "UNKNOWN_PROPERTY",
        15 => "TYPE_CANNOT_HAVE_RANGE",
        30 => "VALUE_OUT_OF_RANGE",
        32 => "PROPERTY_NOT_GETTABLE_OR_SETTABLE",
        40 => "INTERNAL_ERROR",
        41 => "INTERNAL_ERROR_MAYBE_WRONG_COMMAND",
        _ => "UNKNOWN",
    }
}

/// Value decode failures on the PDO / RMI result path.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no subscription for PDID {0}")]
    UnknownPdid(u32),

    #[error("unknown PDO type tag {0:#04x}")]
    UnknownType(u8),

    #[error("truncated value: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("string value is not valid UTF-8")]
    InvalidString,
}

/// Top-level error surfaced by the public API.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Rmi(#[from] RmiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmi_error_names() {
        assert_eq!(RmiError { code: 11 }.name(), "UNKNOWN_CMD");
        assert_eq!(RmiError { code: 30 }.name(), "VALUE_OUT_OF_RANGE");
        assert_eq!(RmiError { code: 41 }.name(), "INTERNAL_ERROR_MAYBE_WRONG_COMMAND");
        assert_eq!(RmiError { code: 200 }.name(), "UNKNOWN");
    }

    #[test]
    fn test_rmi_error_display() {
        let err = RmiError { code: 14 };
        assert_eq!(err.to_string(), "RMI error 14: UNKNOWN_PROPERTY");
    }

    #[test]
    fn test_gateway_result_mapping() {
        assert!(GatewayError::from_result(GatewayResult::Ok).is_none());
        assert!(GatewayError::from_result(GatewayResult::RmiError).is_none());
        assert_eq!(
            GatewayError::from_result(GatewayResult::NotAllowed),
            Some(GatewayError::NotAllowed)
        );
        assert_eq!(
            GatewayError::from_result(GatewayResult::OtherSession),
            Some(GatewayError::OtherSession)
        );
    }
}

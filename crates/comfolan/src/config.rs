// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.

use crate::frame::DEFAULT_MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// The bridge's TCP and UDP port.
pub const BRIDGE_PORT: u16 = 56747;

/// Tunables for a bridge connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// TCP port of the bridge (default: 56747)
    #[serde(default = "default_port")]
    pub port: u16,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Per-request reply timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Keepalive cadence in milliseconds
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,

    /// The connection counts as stalled after this many keepalive
    /// intervals without inbound traffic
    #[serde(default = "default_stall_factor")]
    pub stall_factor: u32,

    /// Ceiling for a single inbound envelope (bytes)
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// Reconnect automatically after an unsolicited disconnect
    #[serde(default)]
    pub auto_reconnect: bool,

    /// First reconnect backoff in milliseconds (doubles per attempt)
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_backoff_ms: u64,

    /// Reconnect backoff cap in milliseconds
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_backoff_ms: u64,

    /// How long to buffer sensor values after session start before
    /// emitting them (the bridge sends stale samples right after connect)
    #[serde(default = "default_sensor_hold_ms")]
    pub sensor_hold_ms: u64,
}

fn default_port() -> u16 {
    BRIDGE_PORT
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_keepalive_interval_ms() -> u64 {
    5_000
}

fn default_stall_factor() -> u32 {
    3
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

fn default_reconnect_initial_ms() -> u64 {
    1_000
}

fn default_reconnect_max_ms() -> u64 {
    30_000
}

fn default_sensor_hold_ms() -> u64 {
    2_000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            stall_factor: default_stall_factor(),
            max_frame_size: default_max_frame_size(),
            auto_reconnect: false,
            reconnect_initial_backoff_ms: default_reconnect_initial_ms(),
            reconnect_max_backoff_ms: default_reconnect_max_ms(),
            sensor_hold_ms: default_sensor_hold_ms(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        config
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Check the configuration for nonsense values.
    pub fn validate(&self) -> Result<(), String> {
        if self.keepalive_interval_ms == 0 {
            return Err("keepalive_interval_ms must be non-zero".into());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be non-zero".into());
        }
        if self.stall_factor < 2 {
            return Err("stall_factor must be at least 2".into());
        }
        if self.max_frame_size < 64 {
            return Err("max_frame_size too small for an envelope".into());
        }
        if self.reconnect_initial_backoff_ms == 0
            || self.reconnect_max_backoff_ms < self.reconnect_initial_backoff_ms
        {
            return Err("reconnect backoff range is inverted".into());
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }

    /// Inbound silence longer than this means the connection stalled.
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms * u64::from(self.stall_factor))
    }

    pub fn reconnect_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_backoff_ms)
    }

    pub fn reconnect_max_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_backoff_ms)
    }

    pub fn sensor_hold(&self) -> Duration {
        Duration::from_millis(self.sensor_hold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 56747);
        assert_eq!(config.keepalive_interval(), Duration::from_secs(5));
        assert_eq!(config.stall_timeout(), Duration::from_secs(15));
        assert!(!config.auto_reconnect);
    }

    #[test]
    fn test_validate_rejects_zero_keepalive() {
        let config = BridgeConfig {
            keepalive_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_backoff() {
        let config = BridgeConfig {
            reconnect_initial_backoff_ms: 10_000,
            reconnect_max_backoff_ms: 1_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: BridgeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, BRIDGE_PORT);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);

        let config: BridgeConfig =
            serde_json::from_str(r#"{"auto_reconnect": true, "keepalive_interval_ms": 250}"#)
                .unwrap();
        assert!(config.auto_reconnect);
        assert_eq!(config.keepalive_interval(), Duration::from_millis(250));
    }
}

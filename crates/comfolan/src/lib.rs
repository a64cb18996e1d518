// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client library for ComfoConnect LAN C ventilation bridges.
//!
//! The bridge fronts a ComfoAir Q ventilation unit over TCP with a
//! length-prefixed envelope protocol; inside the envelopes ride protobuf
//! operation messages carrying two opaque sub-dialects: RMI (byte-oriented
//! get/set/command) and PDO (streamed sensor samples). This crate
//! implements the protocol engine — framing codec, session state machine
//! with keepalive and reconnect, request/response correlation, PDO
//! subscription dispatch, RMI property access — plus UDP bridge discovery
//! and a high-level ventilation client.
//!
//! # Example
//!
//! ```no_run
//! use comfolan::{discover_bridges, Bridge, BridgeConfig, ComfoClient};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), comfolan::Error> {
//! let bridges = discover_bridges(None, Duration::from_secs(1)).await?;
//! let local_uuid = comfolan::parse_uuid("00000000000000000000000000000001").unwrap();
//!
//! let bridge = Bridge::new(
//!     bridges[0].host.clone(),
//!     bridges[0].uuid,
//!     local_uuid,
//!     BridgeConfig::default(),
//! )?;
//! let client = ComfoClient::new(bridge);
//! client.connect().await?;
//! client.set_speed(comfolan::VentilationSpeed::Low).await?;
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod pdo;
pub mod proto;
pub mod rmi;
pub mod sensors;
pub mod session;
pub mod unit;
pub mod util;

mod dispatch;
mod transport;

pub use bridge::{Bridge, BridgeVersion};
pub use dispatch::AlarmHandler;
pub use config::{BridgeConfig, BRIDGE_PORT};
pub use discovery::{discover_bridges, discover_with, DiscoveredBridge};
pub use error::{
    DecodeError, Error, GatewayError, RequestError, RmiError, SessionError, TransportError,
};
pub use pdo::{Consumer, PdoType, PdoValue};
pub use sensors::{Sensor, SENSORS};
pub use session::{Session, SessionState};
pub use unit::{
    AlarmCallback, ComfoClient, ComfoCoolMode, SensorCallback, SensorVentMode,
    TemperatureProfile, VentilationBalance, VentilationMode, VentilationSetting,
    VentilationSpeed,
};
pub use util::{parse_uuid, FirmwareVersion, Uuid};

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge façade.
//!
//! Binds one bridge instance (host, bridge UUID, local UUID) to the
//! session machine and exposes the protocol verbs: app registration,
//! session control, RMI, typed property access, and PDO subscriptions.

use crate::config::BridgeConfig;
use crate::dispatch::AlarmHandler;
use crate::error::{Error, RmiError, SessionError};
use crate::frame::Frame;
use crate::pdo::{self, Consumer, PdoType, PdoValue};
use crate::proto::{
    CnRmiRequest, CnTimeRequest, KeepAlive, ListRegisteredAppsRequest, OperationPayload,
    OperationType, RegisteredApp, VersionRequest,
};
use crate::rmi;
use crate::session::{Session, SessionState};
use crate::util::{FirmwareVersion, Uuid};

/// Version information reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeVersion {
    pub gateway_version: FirmwareVersion,
    pub serial_number: String,
    pub comfonet_version: u32,
}

/// A ComfoConnect LAN C bridge.
pub struct Bridge {
    session: Session,
}

fn payload_mismatch(frame: &Frame) -> Error {
    SessionError::Protocol(format!(
        "confirm carried wrong payload for {:?}",
        frame.op.op_type()
    ))
    .into()
}

impl Bridge {
    /// Bind a bridge instance. No I/O happens until [`Bridge::connect`].
    pub fn new(
        host: impl Into<String>,
        bridge_uuid: Uuid,
        local_uuid: Uuid,
        config: BridgeConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            session: Session::new(host, bridge_uuid, local_uuid, config)?,
        })
    }

    pub fn host(&self) -> &str {
        self.session.host()
    }

    pub fn uuid(&self) -> Uuid {
        self.session.bridge_uuid()
    }

    pub fn local_uuid(&self) -> Uuid {
        self.session.local_uuid()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Access the underlying session (subscription bookkeeping, state).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Connect and start the session. See [`Session::connect`].
    pub async fn connect(&self, take_over: bool) -> Result<(), Error> {
        self.session.connect(take_over).await
    }

    /// Close the session and tear down the connection.
    pub async fn disconnect(&self) {
        self.session.disconnect().await
    }

    /// Register our UUID with the bridge. See [`Session::register_app`].
    pub async fn register_app(&self, device_name: &str, pin: u32) -> Result<(), Error> {
        self.session.register_app(device_name, pin).await
    }

    /// Remove another app's registration.
    pub async fn deregister_app(&self, app_uuid: Uuid) -> Result<(), Error> {
        self.session.deregister_app(app_uuid).await
    }

    /// Install the alarm notification handler.
    pub fn set_alarm_handler(&self, handler: Option<AlarmHandler>) {
        self.session.set_alarm_handler(handler)
    }

    /// Subscribe to a PDO stream. See [`Session::subscribe`].
    pub async fn subscribe(
        &self,
        pdid: u32,
        pdo_type: PdoType,
        dedup: bool,
        consumer: Consumer,
    ) -> Result<(), Error> {
        self.session.subscribe(pdid, pdo_type, dedup, consumer).await
    }

    /// Cancel a PDO subscription.
    pub async fn unsubscribe(&self, pdid: u32, pdo_type: PdoType) -> Result<(), Error> {
        self.session.unsubscribe(pdid, pdo_type).await
    }

    /// List the bridge's registered apps.
    pub async fn list_registered_apps(&self) -> Result<Vec<RegisteredApp>, Error> {
        let frame = self
            .session
            .request(
                OperationType::ListRegisteredAppsRequest,
                OperationPayload::ListRegisteredAppsRequest(ListRegisteredAppsRequest {}),
            )
            .await?;
        match frame.payload {
            OperationPayload::ListRegisteredAppsConfirm(c) => Ok(c.apps),
            _ => Err(payload_mismatch(&frame)),
        }
    }

    /// Query gateway version and serial number.
    pub async fn version(&self) -> Result<BridgeVersion, Error> {
        let frame = self
            .session
            .request(
                OperationType::VersionRequest,
                OperationPayload::VersionRequest(VersionRequest {}),
            )
            .await?;
        match frame.payload {
            OperationPayload::VersionConfirm(c) => Ok(BridgeVersion {
                gateway_version: FirmwareVersion::from_word(c.gateway_version.unwrap_or(0)),
                serial_number: c.serial_number.unwrap_or_default(),
                comfonet_version: c.comfonet_version.unwrap_or(0),
            }),
            _ => Err(payload_mismatch(&frame)),
        }
    }

    /// Read the bridge's clock: seconds since the ComfoNet epoch
    /// (2000-01-01 00:00 UTC).
    pub async fn time(&self) -> Result<u32, Error> {
        let frame = self
            .session
            .request(
                OperationType::CnTimeRequest,
                OperationPayload::CnTimeRequest(CnTimeRequest { set_time: None }),
            )
            .await?;
        match frame.payload {
            OperationPayload::CnTimeConfirm(c) => Ok(c.current_time.unwrap_or(0)),
            _ => Err(payload_mismatch(&frame)),
        }
    }

    /// Send a keepalive. The bridge never replies to these.
    pub async fn keepalive(&self) -> Result<(), Error> {
        self.session
            .send_no_reply(
                OperationType::KeepAlive,
                OperationPayload::KeepAlive(KeepAlive {}),
            )
            .await
    }

    /// Execute an RMI request against a ComfoNet node and return the
    /// reply bytes. A non-zero RMI result surfaces as [`RmiError`].
    pub async fn rmi(&self, node_id: u8, message: Vec<u8>) -> Result<Vec<u8>, Error> {
        let frame = self
            .session
            .request(
                OperationType::CnRmiRequest,
                OperationPayload::CnRmiRequest(CnRmiRequest {
                    node_id: Some(u32::from(node_id)),
                    message: Some(message),
                }),
            )
            .await?;
        match frame.payload {
            OperationPayload::CnRmiResponse(r) => {
                let code = r.result.unwrap_or(0);
                if code != 0 {
                    return Err(RmiError { code }.into());
                }
                Ok(r.message.unwrap_or_default())
            }
            _ => Err(payload_mismatch(&frame)),
        }
    }

    /// Read one property and decode it per `pdo_type`.
    pub async fn get_property(
        &self,
        node_id: u8,
        unit: u8,
        subunit: u8,
        property: u8,
        pdo_type: PdoType,
    ) -> Result<PdoValue, Error> {
        let data = self.rmi(node_id, rmi::get_single(unit, subunit, property)).await?;
        Ok(pdo::decode_value(pdo_type, &data)?)
    }

    /// Read up to 15 properties at once; the reply is the concatenated
    /// raw values.
    pub async fn get_properties(
        &self,
        node_id: u8,
        unit: u8,
        subunit: u8,
        properties: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let message = rmi::get_multiple(unit, subunit, properties)?;
        self.rmi(node_id, message).await
    }

    /// Write one property, encoding `value` per `pdo_type`.
    pub async fn set_property(
        &self,
        node_id: u8,
        unit: u8,
        subunit: u8,
        property: u8,
        value: i64,
        pdo_type: PdoType,
    ) -> Result<(), Error> {
        let bytes = pdo::encode_value(pdo_type, value)?;
        self.rmi(node_id, rmi::set_single(unit, subunit, property, &bytes))
            .await
            .map(drop)
    }

    /// Write one property from caller-encoded bytes.
    pub async fn set_property_raw(
        &self,
        node_id: u8,
        unit: u8,
        subunit: u8,
        property: u8,
        value: &[u8],
    ) -> Result<(), Error> {
        self.rmi(node_id, rmi::set_single(unit, subunit, property, value))
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_binding() {
        let bridge = Bridge::new(
            "192.168.1.10",
            [0xaa; 16],
            [0x01; 16],
            BridgeConfig::default(),
        )
        .unwrap();
        assert_eq!(bridge.host(), "192.168.1.10");
        assert_eq!(bridge.uuid(), [0xaa; 16]);
        assert_eq!(bridge.local_uuid(), [0x01; 16]);
        assert_eq!(bridge.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_verbs_require_connection() {
        let bridge = Bridge::new(
            "localhost",
            [0xaa; 16],
            [0x01; 16],
            BridgeConfig::default(),
        )
        .unwrap();
        assert!(bridge.rmi(1, vec![0x01]).await.is_err());
        assert!(bridge.list_registered_apps().await.is_err());
        assert!(bridge.keepalive().await.is_err());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Vendor protobuf schema for the bridge protocol.
//!
//! Hand-maintained `prost` message definitions mirroring the bridge's wire
//! schema. Field numbers and enum values are fixed by the vendor firmware;
//! do not renumber. Payloads for operations the engine does not model are
//! carried opaquely by [`OperationPayload::Unknown`].

use prost::Message;

/// Operation type discriminator carried in every [`GatewayOperation`].
///
/// Requests are numbered 1..=18 and 30..=42; their confirms sit 50 higher
/// for the gateway operations, and are interleaved for the ComfoNet (`Cn*`)
/// operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OperationType {
    NoOperation = 0,
    SetAddressRequest = 1,
    RegisterAppRequest = 2,
    StartSessionRequest = 3,
    CloseSessionRequest = 4,
    ListRegisteredAppsRequest = 5,
    DeregisterAppRequest = 6,
    ChangePinRequest = 7,
    GetRemoteAccessIdRequest = 8,
    SetRemoteAccessIdRequest = 9,
    GetSupportIdRequest = 10,
    SetSupportIdRequest = 11,
    GetWebIdRequest = 12,
    SetWebIdRequest = 13,
    VersionRequest = 18,
    CnTimeRequest = 30,
    CnTimeConfirm = 31,
    CnNodeNotification = 32,
    CnRmiRequest = 33,
    CnRmiResponse = 34,
    CnRmiAsyncRequest = 35,
    CnRmiAsyncConfirm = 36,
    CnRmiAsyncResponse = 37,
    CnRpdoRequest = 38,
    CnRpdoConfirm = 39,
    CnRpdoNotification = 40,
    CnAlarmNotification = 41,
    CnNodeRequest = 42,
    SetAddressConfirm = 51,
    RegisterAppConfirm = 52,
    StartSessionConfirm = 53,
    CloseSessionConfirm = 54,
    ListRegisteredAppsConfirm = 55,
    DeregisterAppConfirm = 56,
    ChangePinConfirm = 57,
    GetRemoteAccessIdConfirm = 58,
    SetRemoteAccessIdConfirm = 59,
    GetSupportIdConfirm = 60,
    SetSupportIdConfirm = 61,
    GetWebIdConfirm = 62,
    SetWebIdConfirm = 63,
    VersionConfirm = 68,
    GatewayNotification = 100,
    KeepAlive = 101,
}

impl OperationType {
    /// The confirm type a request of this type is answered with, if any.
    ///
    /// Gateway operations (1..=18) confirm at `type + 50`; ComfoNet
    /// operations have their own pairing. Notifications and confirms
    /// return `None`.
    pub fn expected_confirm(self) -> Option<OperationType> {
        use OperationType::*;
        match self {
            SetAddressRequest => Some(SetAddressConfirm),
            RegisterAppRequest => Some(RegisterAppConfirm),
            StartSessionRequest => Some(StartSessionConfirm),
            CloseSessionRequest => Some(CloseSessionConfirm),
            ListRegisteredAppsRequest => Some(ListRegisteredAppsConfirm),
            DeregisterAppRequest => Some(DeregisterAppConfirm),
            ChangePinRequest => Some(ChangePinConfirm),
            GetRemoteAccessIdRequest => Some(GetRemoteAccessIdConfirm),
            SetRemoteAccessIdRequest => Some(SetRemoteAccessIdConfirm),
            GetSupportIdRequest => Some(GetSupportIdConfirm),
            SetSupportIdRequest => Some(SetSupportIdConfirm),
            GetWebIdRequest => Some(GetWebIdConfirm),
            SetWebIdRequest => Some(SetWebIdConfirm),
            VersionRequest => Some(VersionConfirm),
            CnTimeRequest => Some(CnTimeConfirm),
            CnRmiRequest => Some(CnRmiResponse),
            CnRmiAsyncRequest => Some(CnRmiAsyncConfirm),
            CnRpdoRequest => Some(CnRpdoConfirm),
            _ => None,
        }
    }

    /// Whether this operation is server-initiated and never carries a
    /// request reference to match on.
    pub fn is_notification(self) -> bool {
        matches!(
            self,
            OperationType::CnRpdoNotification
                | OperationType::CnNodeNotification
                | OperationType::CnAlarmNotification
                | OperationType::GatewayNotification
        )
    }
}

/// Result code the bridge attaches to replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum GatewayResult {
    Ok = 0,
    BadRequest = 1,
    InternalError = 2,
    NotReachable = 3,
    OtherSession = 4,
    NotAllowed = 5,
    NoResources = 6,
    NotExist = 7,
    RmiError = 8,
}

/// Operation header present in every envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GatewayOperation {
    #[prost(enumeration = "OperationType", optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(uint32, optional, tag = "2")]
    pub reference: Option<u32>,
    #[prost(enumeration = "GatewayResult", optional, tag = "3")]
    pub result: Option<i32>,
    #[prost(string, optional, tag = "4")]
    pub result_description: Option<String>,
}

impl GatewayOperation {
    /// Build a header for an outbound request.
    pub fn request(op: OperationType, reference: u32) -> Self {
        Self {
            r#type: Some(op as i32),
            reference: Some(reference),
            result: None,
            result_description: None,
        }
    }

    /// The operation type, if it is one the engine models.
    pub fn op_type(&self) -> Option<OperationType> {
        self.r#type.and_then(|t| OperationType::try_from(t).ok())
    }

    /// The result code, defaulting to `Ok` when absent.
    pub fn result_code(&self) -> GatewayResult {
        self.result
            .and_then(|r| GatewayResult::try_from(r).ok())
            .unwrap_or(GatewayResult::Ok)
    }
}

// ---------------------------------------------------------------------------
// Operation payloads
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetAddressRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetAddressConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterAppRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "2")]
    pub pin: Option<u32>,
    #[prost(string, optional, tag = "3")]
    pub devicename: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterAppConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartSessionRequest {
    #[prost(bool, optional, tag = "1")]
    pub takeover: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartSessionConfirm {
    #[prost(string, optional, tag = "1")]
    pub devicename: Option<String>,
    #[prost(bool, optional, tag = "2")]
    pub resumed: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CloseSessionRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CloseSessionConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRegisteredAppsRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRegisteredAppsConfirm {
    #[prost(message, repeated, tag = "1")]
    pub apps: Vec<RegisteredApp>,
}

/// One entry in the bridge's app registration table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisteredApp {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
    #[prost(string, optional, tag = "2")]
    pub devicename: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeregisterAppRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeregisterAppConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangePinRequest {
    #[prost(uint32, optional, tag = "1")]
    pub old_pin: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub new_pin: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangePinConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRemoteAccessIdRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRemoteAccessIdConfirm {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetRemoteAccessIdRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetRemoteAccessIdConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSupportIdRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSupportIdConfirm {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "2")]
    pub remaining_time: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetSupportIdRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "2")]
    pub valid_time: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetSupportIdConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetWebIdRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetWebIdConfirm {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetWebIdRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetWebIdConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VersionRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VersionConfirm {
    #[prost(uint32, optional, tag = "1")]
    pub gateway_version: Option<u32>,
    #[prost(string, optional, tag = "2")]
    pub serial_number: Option<String>,
    #[prost(uint32, optional, tag = "3")]
    pub comfonet_version: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnTimeRequest {
    #[prost(uint32, optional, tag = "1")]
    pub set_time: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnTimeConfirm {
    #[prost(uint32, optional, tag = "1")]
    pub current_time: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnNodeRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnNodeNotification {
    #[prost(uint32, optional, tag = "1")]
    pub node_id: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub product_id: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub zone_id: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub mode: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRmiRequest {
    #[prost(uint32, optional, tag = "1")]
    pub node_id: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRmiResponse {
    #[prost(uint32, optional, tag = "1")]
    pub result: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRmiAsyncRequest {
    #[prost(uint32, optional, tag = "1")]
    pub node_id: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRmiAsyncConfirm {
    #[prost(uint32, optional, tag = "1")]
    pub result: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRmiAsyncResponse {
    #[prost(uint32, optional, tag = "1")]
    pub result: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRpdoRequest {
    #[prost(uint32, optional, tag = "1")]
    pub pdid: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub zone: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub r#type: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub timeout: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRpdoConfirm {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnRpdoNotification {
    #[prost(uint32, optional, tag = "1")]
    pub pdid: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub data: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CnAlarmNotification {
    #[prost(uint32, optional, tag = "1")]
    pub zone: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub product_id: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub product_variant: Option<u32>,
    #[prost(string, optional, tag = "4")]
    pub serial_number: Option<String>,
    #[prost(uint32, optional, tag = "5")]
    pub sw_program_version: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub errors: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "7")]
    pub error_id: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub node_id: Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GatewayNotification {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub push_uuids: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "2")]
    pub alarm: Option<CnAlarmNotification>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeepAlive {}

// ---------------------------------------------------------------------------
// Discovery (UDP, frame-less)
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiscoveryOperation {
    #[prost(message, optional, tag = "1")]
    pub search_gateway_request: Option<SearchGatewayRequest>,
    #[prost(message, optional, tag = "2")]
    pub search_gateway_response: Option<SearchGatewayResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchGatewayRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchGatewayResponse {
    #[prost(string, optional, tag = "1")]
    pub ipaddress: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub uuid: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "3")]
    pub version: Option<u32>,
}

// ---------------------------------------------------------------------------
// Tagged payload variant
// ---------------------------------------------------------------------------

/// Operation payload, selected by the [`OperationType`] in the header.
///
/// Unknown tags keep their raw bytes so they survive logging and
/// re-encoding unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationPayload {
    SetAddressRequest(SetAddressRequest),
    SetAddressConfirm(SetAddressConfirm),
    RegisterAppRequest(RegisterAppRequest),
    RegisterAppConfirm(RegisterAppConfirm),
    StartSessionRequest(StartSessionRequest),
    StartSessionConfirm(StartSessionConfirm),
    CloseSessionRequest(CloseSessionRequest),
    CloseSessionConfirm(CloseSessionConfirm),
    ListRegisteredAppsRequest(ListRegisteredAppsRequest),
    ListRegisteredAppsConfirm(ListRegisteredAppsConfirm),
    DeregisterAppRequest(DeregisterAppRequest),
    DeregisterAppConfirm(DeregisterAppConfirm),
    ChangePinRequest(ChangePinRequest),
    ChangePinConfirm(ChangePinConfirm),
    GetRemoteAccessIdRequest(GetRemoteAccessIdRequest),
    GetRemoteAccessIdConfirm(GetRemoteAccessIdConfirm),
    SetRemoteAccessIdRequest(SetRemoteAccessIdRequest),
    SetRemoteAccessIdConfirm(SetRemoteAccessIdConfirm),
    GetSupportIdRequest(GetSupportIdRequest),
    GetSupportIdConfirm(GetSupportIdConfirm),
    SetSupportIdRequest(SetSupportIdRequest),
    SetSupportIdConfirm(SetSupportIdConfirm),
    GetWebIdRequest(GetWebIdRequest),
    GetWebIdConfirm(GetWebIdConfirm),
    SetWebIdRequest(SetWebIdRequest),
    SetWebIdConfirm(SetWebIdConfirm),
    VersionRequest(VersionRequest),
    VersionConfirm(VersionConfirm),
    CnTimeRequest(CnTimeRequest),
    CnTimeConfirm(CnTimeConfirm),
    CnNodeRequest(CnNodeRequest),
    CnNodeNotification(CnNodeNotification),
    CnRmiRequest(CnRmiRequest),
    CnRmiResponse(CnRmiResponse),
    CnRmiAsyncRequest(CnRmiAsyncRequest),
    CnRmiAsyncConfirm(CnRmiAsyncConfirm),
    CnRmiAsyncResponse(CnRmiAsyncResponse),
    CnRpdoRequest(CnRpdoRequest),
    CnRpdoConfirm(CnRpdoConfirm),
    CnRpdoNotification(CnRpdoNotification),
    CnAlarmNotification(CnAlarmNotification),
    GatewayNotification(GatewayNotification),
    KeepAlive(KeepAlive),
    /// Operation the engine does not model; bytes preserved verbatim.
    Unknown { tag: i32, data: Vec<u8> },
}

impl OperationPayload {
    /// Decode payload bytes as the message type selected by `tag`.
    ///
    /// An unmodeled tag yields [`OperationPayload::Unknown`]; a decode
    /// failure of a modeled type is an error (the envelope is malformed).
    pub fn decode(tag: i32, buf: &[u8]) -> Result<Self, prost::DecodeError> {
        let Ok(op) = OperationType::try_from(tag) else {
            return Ok(Self::Unknown {
                tag,
                data: buf.to_vec(),
            });
        };

        use OperationType as T;
        Ok(match op {
            T::NoOperation => Self::Unknown {
                tag,
                data: buf.to_vec(),
            },
            T::SetAddressRequest => Self::SetAddressRequest(Message::decode(buf)?),
            T::SetAddressConfirm => Self::SetAddressConfirm(Message::decode(buf)?),
            T::RegisterAppRequest => Self::RegisterAppRequest(Message::decode(buf)?),
            T::RegisterAppConfirm => Self::RegisterAppConfirm(Message::decode(buf)?),
            T::StartSessionRequest => Self::StartSessionRequest(Message::decode(buf)?),
            T::StartSessionConfirm => Self::StartSessionConfirm(Message::decode(buf)?),
            T::CloseSessionRequest => Self::CloseSessionRequest(Message::decode(buf)?),
            T::CloseSessionConfirm => Self::CloseSessionConfirm(Message::decode(buf)?),
            T::ListRegisteredAppsRequest => Self::ListRegisteredAppsRequest(Message::decode(buf)?),
            T::ListRegisteredAppsConfirm => Self::ListRegisteredAppsConfirm(Message::decode(buf)?),
            T::DeregisterAppRequest => Self::DeregisterAppRequest(Message::decode(buf)?),
            T::DeregisterAppConfirm => Self::DeregisterAppConfirm(Message::decode(buf)?),
            T::ChangePinRequest => Self::ChangePinRequest(Message::decode(buf)?),
            T::ChangePinConfirm => Self::ChangePinConfirm(Message::decode(buf)?),
            T::GetRemoteAccessIdRequest => Self::GetRemoteAccessIdRequest(Message::decode(buf)?),
            T::GetRemoteAccessIdConfirm => Self::GetRemoteAccessIdConfirm(Message::decode(buf)?),
            T::SetRemoteAccessIdRequest => Self::SetRemoteAccessIdRequest(Message::decode(buf)?),
            T::SetRemoteAccessIdConfirm => Self::SetRemoteAccessIdConfirm(Message::decode(buf)?),
            T::GetSupportIdRequest => Self::GetSupportIdRequest(Message::decode(buf)?),
            T::GetSupportIdConfirm => Self::GetSupportIdConfirm(Message::decode(buf)?),
            T::SetSupportIdRequest => Self::SetSupportIdRequest(Message::decode(buf)?),
            T::SetSupportIdConfirm => Self::SetSupportIdConfirm(Message::decode(buf)?),
            T::GetWebIdRequest => Self::GetWebIdRequest(Message::decode(buf)?),
            T::GetWebIdConfirm => Self::GetWebIdConfirm(Message::decode(buf)?),
            T::SetWebIdRequest => Self::SetWebIdRequest(Message::decode(buf)?),
            T::SetWebIdConfirm => Self::SetWebIdConfirm(Message::decode(buf)?),
            T::VersionRequest => Self::VersionRequest(Message::decode(buf)?),
            T::VersionConfirm => Self::VersionConfirm(Message::decode(buf)?),
            T::CnTimeRequest => Self::CnTimeRequest(Message::decode(buf)?),
            T::CnTimeConfirm => Self::CnTimeConfirm(Message::decode(buf)?),
            T::CnNodeRequest => Self::CnNodeRequest(Message::decode(buf)?),
            T::CnNodeNotification => Self::CnNodeNotification(Message::decode(buf)?),
            T::CnRmiRequest => Self::CnRmiRequest(Message::decode(buf)?),
            T::CnRmiResponse => Self::CnRmiResponse(Message::decode(buf)?),
            T::CnRmiAsyncRequest => Self::CnRmiAsyncRequest(Message::decode(buf)?),
            T::CnRmiAsyncConfirm => Self::CnRmiAsyncConfirm(Message::decode(buf)?),
            T::CnRmiAsyncResponse => Self::CnRmiAsyncResponse(Message::decode(buf)?),
            T::CnRpdoRequest => Self::CnRpdoRequest(Message::decode(buf)?),
            T::CnRpdoConfirm => Self::CnRpdoConfirm(Message::decode(buf)?),
            T::CnRpdoNotification => Self::CnRpdoNotification(Message::decode(buf)?),
            T::CnAlarmNotification => Self::CnAlarmNotification(Message::decode(buf)?),
            T::GatewayNotification => Self::GatewayNotification(Message::decode(buf)?),
            T::KeepAlive => Self::KeepAlive(Message::decode(buf)?),
        })
    }

    /// Serialize the payload message.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        match self {
            Self::SetAddressRequest(m) => m.encode_to_vec(),
            Self::SetAddressConfirm(m) => m.encode_to_vec(),
            Self::RegisterAppRequest(m) => m.encode_to_vec(),
            Self::RegisterAppConfirm(m) => m.encode_to_vec(),
            Self::StartSessionRequest(m) => m.encode_to_vec(),
            Self::StartSessionConfirm(m) => m.encode_to_vec(),
            Self::CloseSessionRequest(m) => m.encode_to_vec(),
            Self::CloseSessionConfirm(m) => m.encode_to_vec(),
            Self::ListRegisteredAppsRequest(m) => m.encode_to_vec(),
            Self::ListRegisteredAppsConfirm(m) => m.encode_to_vec(),
            Self::DeregisterAppRequest(m) => m.encode_to_vec(),
            Self::DeregisterAppConfirm(m) => m.encode_to_vec(),
            Self::ChangePinRequest(m) => m.encode_to_vec(),
            Self::ChangePinConfirm(m) => m.encode_to_vec(),
            Self::GetRemoteAccessIdRequest(m) => m.encode_to_vec(),
            Self::GetRemoteAccessIdConfirm(m) => m.encode_to_vec(),
            Self::SetRemoteAccessIdRequest(m) => m.encode_to_vec(),
            Self::SetRemoteAccessIdConfirm(m) => m.encode_to_vec(),
            Self::GetSupportIdRequest(m) => m.encode_to_vec(),
            Self::GetSupportIdConfirm(m) => m.encode_to_vec(),
            Self::SetSupportIdRequest(m) => m.encode_to_vec(),
            Self::SetSupportIdConfirm(m) => m.encode_to_vec(),
            Self::GetWebIdRequest(m) => m.encode_to_vec(),
            Self::GetWebIdConfirm(m) => m.encode_to_vec(),
            Self::SetWebIdRequest(m) => m.encode_to_vec(),
            Self::SetWebIdConfirm(m) => m.encode_to_vec(),
            Self::VersionRequest(m) => m.encode_to_vec(),
            Self::VersionConfirm(m) => m.encode_to_vec(),
            Self::CnTimeRequest(m) => m.encode_to_vec(),
            Self::CnTimeConfirm(m) => m.encode_to_vec(),
            Self::CnNodeRequest(m) => m.encode_to_vec(),
            Self::CnNodeNotification(m) => m.encode_to_vec(),
            Self::CnRmiRequest(m) => m.encode_to_vec(),
            Self::CnRmiResponse(m) => m.encode_to_vec(),
            Self::CnRmiAsyncRequest(m) => m.encode_to_vec(),
            Self::CnRmiAsyncConfirm(m) => m.encode_to_vec(),
            Self::CnRmiAsyncResponse(m) => m.encode_to_vec(),
            Self::CnRpdoRequest(m) => m.encode_to_vec(),
            Self::CnRpdoConfirm(m) => m.encode_to_vec(),
            Self::CnRpdoNotification(m) => m.encode_to_vec(),
            Self::CnAlarmNotification(m) => m.encode_to_vec(),
            Self::GatewayNotification(m) => m.encode_to_vec(),
            Self::KeepAlive(m) => m.encode_to_vec(),
            Self::Unknown { data, .. } => data.clone(),
        }
    }
}

//! The fixed native-API message schema and its type-id registry.
//!
//! Type ids and field numbers are an external contract shared with
//! real clients; they are listed in [`type_id`] and must never change.
//! [`ApiMessage`] is the registry: decoding maps a type id to a typed
//! variant, and every variant knows its own id, so an "unregistered"
//! outbound message is unrepresentable.

use espnode_domain::category::EntityCategory;
use espnode_domain::key::EntityKey;
use espnode_domain::log::LogLevel;

use crate::wire::{FieldReader, FieldWriter, WireError};

/// Wire type ids for every message this device speaks or recognises.
pub mod type_id {
    pub const HELLO_REQUEST: u32 = 1;
    pub const HELLO_RESPONSE: u32 = 2;
    pub const CONNECT_REQUEST: u32 = 3;
    pub const CONNECT_RESPONSE: u32 = 4;
    pub const DISCONNECT_REQUEST: u32 = 5;
    pub const DISCONNECT_RESPONSE: u32 = 6;
    pub const PING_REQUEST: u32 = 7;
    pub const PING_RESPONSE: u32 = 8;
    pub const DEVICE_INFO_REQUEST: u32 = 9;
    pub const DEVICE_INFO_RESPONSE: u32 = 10;
    pub const LIST_ENTITIES_REQUEST: u32 = 11;
    pub const LIST_ENTITIES_BINARY_SENSOR_RESPONSE: u32 = 12;
    pub const LIST_ENTITIES_SWITCH_RESPONSE: u32 = 17;
    pub const LIST_ENTITIES_DONE_RESPONSE: u32 = 19;
    pub const SUBSCRIBE_STATES_REQUEST: u32 = 20;
    pub const BINARY_SENSOR_STATE_RESPONSE: u32 = 21;
    pub const SWITCH_STATE_RESPONSE: u32 = 26;
    pub const SUBSCRIBE_LOGS_REQUEST: u32 = 28;
    pub const SUBSCRIBE_LOGS_RESPONSE: u32 = 29;
    pub const SWITCH_COMMAND_REQUEST: u32 = 33;
    pub const SUBSCRIBE_HA_SERVICES_REQUEST: u32 = 34;
    pub const GET_TIME_REQUEST: u32 = 36;
    pub const SUBSCRIBE_HA_STATES_REQUEST: u32 = 38;
}

/// Payload decoding failure for a recognised type id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("malformed payload for message type {type_id}: {source}")]
pub struct DecodeError {
    /// The frame's type id.
    pub type_id: u32,
    #[source]
    source: WireError,
}

/// First frame from a client; negotiates the protocol version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloRequest {
    pub client_info: String,
    pub api_version_major: u32,
    pub api_version_minor: u32,
}

/// Version advertisement sent in reply to [`HelloRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloResponse {
    pub api_version_major: u32,
    pub api_version_minor: u32,
    pub server_info: String,
    pub name: String,
}

/// Authentication request; this device never requires a password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectRequest {
    pub password: String,
}

/// Authentication result; always accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectResponse {
    pub invalid_password: bool,
}

/// Device identity for controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfoResponse {
    pub uses_password: bool,
    pub name: String,
    pub mac_address: String,
    pub model: String,
    pub project_name: String,
    pub project_version: String,
}

/// Descriptor for a binary sensor entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEntitiesBinarySensorResponse {
    pub object_id: String,
    pub key: u32,
    pub name: String,
    pub unique_id: String,
    pub device_class: String,
    pub is_status_binary_sensor: bool,
    pub disabled_by_default: bool,
    pub icon: String,
    pub entity_category: EntityCategory,
}

/// Descriptor for a switch entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEntitiesSwitchResponse {
    pub object_id: String,
    pub key: u32,
    pub name: String,
    pub unique_id: String,
    pub icon: String,
    pub assumed_state: bool,
    pub disabled_by_default: bool,
    pub entity_category: EntityCategory,
    pub device_class: String,
}

/// State snapshot for a binary sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinarySensorStateResponse {
    pub key: u32,
    pub state: bool,
    pub missing_state: bool,
}

/// State snapshot for a switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchStateResponse {
    pub key: u32,
    pub state: bool,
}

/// Log subscription request with requested verbosity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeLogsRequest {
    pub level: LogLevel,
    pub dump_config: bool,
}

/// One log line pushed to a subscribed client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeLogsResponse {
    pub level: LogLevel,
    pub message: Vec<u8>,
}

/// Command addressed to a switch by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchCommandRequest {
    pub key: u32,
    pub state: bool,
}

/// Every message the device can read or write, tagged by schema.
///
/// Field-less messages are unit variants. Dispatch over this enum is
/// exhaustive: adding a message type forces every `match` to be
/// revisited.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiMessage {
    HelloRequest(HelloRequest),
    HelloResponse(HelloResponse),
    ConnectRequest(ConnectRequest),
    ConnectResponse(ConnectResponse),
    DisconnectRequest,
    DisconnectResponse,
    PingRequest,
    PingResponse,
    DeviceInfoRequest,
    DeviceInfoResponse(DeviceInfoResponse),
    ListEntitiesRequest,
    ListEntitiesBinarySensorResponse(ListEntitiesBinarySensorResponse),
    ListEntitiesSwitchResponse(ListEntitiesSwitchResponse),
    ListEntitiesDoneResponse,
    SubscribeStatesRequest,
    BinarySensorStateResponse(BinarySensorStateResponse),
    SwitchStateResponse(SwitchStateResponse),
    SubscribeLogsRequest(SubscribeLogsRequest),
    SubscribeLogsResponse(SubscribeLogsResponse),
    SwitchCommandRequest(SwitchCommandRequest),
    /// Recognised placeholder; decoded and ignored.
    SubscribeHomeassistantServicesRequest,
    /// Recognised placeholder; decoded and ignored.
    GetTimeRequest,
    /// Recognised placeholder; decoded and ignored.
    SubscribeHomeAssistantStatesRequest,
}

impl ApiMessage {
    /// Decode a frame payload.
    ///
    /// `Ok(None)` means the type id is outside the registry — the
    /// caller must treat the frame as unparseable and drop the
    /// connection. `Err` means the id was recognised but the payload
    /// violated its schema.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for a malformed payload.
    pub fn decode(ty: u32, payload: &[u8]) -> Result<Option<Self>, DecodeError> {
        let wrap = |source: WireError| DecodeError {
            type_id: ty,
            source,
        };
        let msg = match ty {
            type_id::HELLO_REQUEST => Self::HelloRequest(decode_hello_request(payload).map_err(wrap)?),
            type_id::HELLO_RESPONSE => Self::HelloResponse(decode_hello_response(payload).map_err(wrap)?),
            type_id::CONNECT_REQUEST => Self::ConnectRequest(decode_connect_request(payload).map_err(wrap)?),
            type_id::CONNECT_RESPONSE => Self::ConnectResponse(decode_connect_response(payload).map_err(wrap)?),
            type_id::DISCONNECT_REQUEST => Self::DisconnectRequest,
            type_id::DISCONNECT_RESPONSE => Self::DisconnectResponse,
            type_id::PING_REQUEST => Self::PingRequest,
            type_id::PING_RESPONSE => Self::PingResponse,
            type_id::DEVICE_INFO_REQUEST => Self::DeviceInfoRequest,
            type_id::DEVICE_INFO_RESPONSE => {
                Self::DeviceInfoResponse(decode_device_info_response(payload).map_err(wrap)?)
            }
            type_id::LIST_ENTITIES_REQUEST => Self::ListEntitiesRequest,
            type_id::LIST_ENTITIES_BINARY_SENSOR_RESPONSE => Self::ListEntitiesBinarySensorResponse(
                decode_list_binary_sensor(payload).map_err(wrap)?,
            ),
            type_id::LIST_ENTITIES_SWITCH_RESPONSE => {
                Self::ListEntitiesSwitchResponse(decode_list_switch(payload).map_err(wrap)?)
            }
            type_id::LIST_ENTITIES_DONE_RESPONSE => Self::ListEntitiesDoneResponse,
            type_id::SUBSCRIBE_STATES_REQUEST => Self::SubscribeStatesRequest,
            type_id::BINARY_SENSOR_STATE_RESPONSE => {
                Self::BinarySensorStateResponse(decode_binary_sensor_state(payload).map_err(wrap)?)
            }
            type_id::SWITCH_STATE_RESPONSE => {
                Self::SwitchStateResponse(decode_switch_state(payload).map_err(wrap)?)
            }
            type_id::SUBSCRIBE_LOGS_REQUEST => {
                Self::SubscribeLogsRequest(decode_subscribe_logs_request(payload).map_err(wrap)?)
            }
            type_id::SUBSCRIBE_LOGS_RESPONSE => {
                Self::SubscribeLogsResponse(decode_subscribe_logs_response(payload).map_err(wrap)?)
            }
            type_id::SWITCH_COMMAND_REQUEST => {
                Self::SwitchCommandRequest(decode_switch_command(payload).map_err(wrap)?)
            }
            type_id::SUBSCRIBE_HA_SERVICES_REQUEST => Self::SubscribeHomeassistantServicesRequest,
            type_id::GET_TIME_REQUEST => Self::GetTimeRequest,
            type_id::SUBSCRIBE_HA_STATES_REQUEST => Self::SubscribeHomeAssistantStatesRequest,
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }

    /// The wire type id for this message.
    #[must_use]
    pub fn type_id(&self) -> u32 {
        match self {
            Self::HelloRequest(_) => type_id::HELLO_REQUEST,
            Self::HelloResponse(_) => type_id::HELLO_RESPONSE,
            Self::ConnectRequest(_) => type_id::CONNECT_REQUEST,
            Self::ConnectResponse(_) => type_id::CONNECT_RESPONSE,
            Self::DisconnectRequest => type_id::DISCONNECT_REQUEST,
            Self::DisconnectResponse => type_id::DISCONNECT_RESPONSE,
            Self::PingRequest => type_id::PING_REQUEST,
            Self::PingResponse => type_id::PING_RESPONSE,
            Self::DeviceInfoRequest => type_id::DEVICE_INFO_REQUEST,
            Self::DeviceInfoResponse(_) => type_id::DEVICE_INFO_RESPONSE,
            Self::ListEntitiesRequest => type_id::LIST_ENTITIES_REQUEST,
            Self::ListEntitiesBinarySensorResponse(_) => {
                type_id::LIST_ENTITIES_BINARY_SENSOR_RESPONSE
            }
            Self::ListEntitiesSwitchResponse(_) => type_id::LIST_ENTITIES_SWITCH_RESPONSE,
            Self::ListEntitiesDoneResponse => type_id::LIST_ENTITIES_DONE_RESPONSE,
            Self::SubscribeStatesRequest => type_id::SUBSCRIBE_STATES_REQUEST,
            Self::BinarySensorStateResponse(_) => type_id::BINARY_SENSOR_STATE_RESPONSE,
            Self::SwitchStateResponse(_) => type_id::SWITCH_STATE_RESPONSE,
            Self::SubscribeLogsRequest(_) => type_id::SUBSCRIBE_LOGS_REQUEST,
            Self::SubscribeLogsResponse(_) => type_id::SUBSCRIBE_LOGS_RESPONSE,
            Self::SwitchCommandRequest(_) => type_id::SWITCH_COMMAND_REQUEST,
            Self::SubscribeHomeassistantServicesRequest => type_id::SUBSCRIBE_HA_SERVICES_REQUEST,
            Self::GetTimeRequest => type_id::GET_TIME_REQUEST,
            Self::SubscribeHomeAssistantStatesRequest => type_id::SUBSCRIBE_HA_STATES_REQUEST,
        }
    }

    /// Encode this message's payload (without the frame header).
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut w = FieldWriter::new();
        match self {
            Self::HelloRequest(m) => {
                w.string(1, &m.client_info);
                w.varint(2, u64::from(m.api_version_major));
                w.varint(3, u64::from(m.api_version_minor));
            }
            Self::HelloResponse(m) => {
                w.varint(1, u64::from(m.api_version_major));
                w.varint(2, u64::from(m.api_version_minor));
                w.string(3, &m.server_info);
                w.string(4, &m.name);
            }
            Self::ConnectRequest(m) => {
                w.string(1, &m.password);
            }
            Self::ConnectResponse(m) => {
                w.bool(1, m.invalid_password);
            }
            Self::DeviceInfoResponse(m) => {
                w.bool(1, m.uses_password);
                w.string(2, &m.name);
                w.string(3, &m.mac_address);
                w.string(6, &m.model);
                w.string(8, &m.project_name);
                w.string(9, &m.project_version);
            }
            Self::ListEntitiesBinarySensorResponse(m) => {
                w.string(1, &m.object_id);
                w.fixed32(2, m.key);
                w.string(3, &m.name);
                w.string(4, &m.unique_id);
                w.string(5, &m.device_class);
                w.bool(6, m.is_status_binary_sensor);
                w.bool(7, m.disabled_by_default);
                w.string(8, &m.icon);
                w.varint(9, u64::from(m.entity_category.as_u32()));
            }
            Self::ListEntitiesSwitchResponse(m) => {
                w.string(1, &m.object_id);
                w.fixed32(2, m.key);
                w.string(3, &m.name);
                w.string(4, &m.unique_id);
                w.string(5, &m.icon);
                w.bool(6, m.assumed_state);
                w.bool(7, m.disabled_by_default);
                w.varint(8, u64::from(m.entity_category.as_u32()));
                w.string(9, &m.device_class);
            }
            Self::BinarySensorStateResponse(m) => {
                w.fixed32(1, m.key);
                w.bool(2, m.state);
                w.bool(3, m.missing_state);
            }
            Self::SwitchStateResponse(m) => {
                w.fixed32(1, m.key);
                w.bool(2, m.state);
            }
            Self::SubscribeLogsRequest(m) => {
                w.varint(1, u64::from(m.level.as_u32()));
                w.bool(2, m.dump_config);
            }
            Self::SubscribeLogsResponse(m) => {
                w.varint(1, u64::from(m.level.as_u32()));
                w.bytes(3, &m.message);
            }
            Self::SwitchCommandRequest(m) => {
                w.fixed32(1, m.key);
                w.bool(2, m.state);
            }
            Self::DisconnectRequest
            | Self::DisconnectResponse
            | Self::PingRequest
            | Self::PingResponse
            | Self::DeviceInfoRequest
            | Self::ListEntitiesRequest
            | Self::ListEntitiesDoneResponse
            | Self::SubscribeStatesRequest
            | Self::SubscribeHomeassistantServicesRequest
            | Self::GetTimeRequest
            | Self::SubscribeHomeAssistantStatesRequest => {}
        }
        w.finish()
    }

    /// The entity key this message addresses or describes, if any.
    #[must_use]
    pub fn entity_key(&self) -> Option<EntityKey> {
        match self {
            Self::SwitchCommandRequest(m) => Some(EntityKey::new(m.key)),
            Self::BinarySensorStateResponse(m) => Some(EntityKey::new(m.key)),
            Self::SwitchStateResponse(m) => Some(EntityKey::new(m.key)),
            _ => None,
        }
    }
}

fn decode_hello_request(payload: &[u8]) -> Result<HelloRequest, WireError> {
    let mut msg = HelloRequest::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.client_info = value.string(num)?,
            2 => msg.api_version_major = value.u32(num)?,
            3 => msg.api_version_minor = value.u32(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_hello_response(payload: &[u8]) -> Result<HelloResponse, WireError> {
    let mut msg = HelloResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.api_version_major = value.u32(num)?,
            2 => msg.api_version_minor = value.u32(num)?,
            3 => msg.server_info = value.string(num)?,
            4 => msg.name = value.string(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_connect_request(payload: &[u8]) -> Result<ConnectRequest, WireError> {
    let mut msg = ConnectRequest::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        if num == 1 {
            msg.password = value.string(num)?;
        }
    }
    Ok(msg)
}

fn decode_connect_response(payload: &[u8]) -> Result<ConnectResponse, WireError> {
    let mut msg = ConnectResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        if num == 1 {
            msg.invalid_password = value.bool(num)?;
        }
    }
    Ok(msg)
}

fn decode_device_info_response(payload: &[u8]) -> Result<DeviceInfoResponse, WireError> {
    let mut msg = DeviceInfoResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.uses_password = value.bool(num)?,
            2 => msg.name = value.string(num)?,
            3 => msg.mac_address = value.string(num)?,
            6 => msg.model = value.string(num)?,
            8 => msg.project_name = value.string(num)?,
            9 => msg.project_version = value.string(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_list_binary_sensor(
    payload: &[u8],
) -> Result<ListEntitiesBinarySensorResponse, WireError> {
    let mut msg = ListEntitiesBinarySensorResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.object_id = value.string(num)?,
            2 => msg.key = value.fixed32(num)?,
            3 => msg.name = value.string(num)?,
            4 => msg.unique_id = value.string(num)?,
            5 => msg.device_class = value.string(num)?,
            6 => msg.is_status_binary_sensor = value.bool(num)?,
            7 => msg.disabled_by_default = value.bool(num)?,
            8 => msg.icon = value.string(num)?,
            9 => msg.entity_category = EntityCategory::from_u32(value.u32(num)?),
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_list_switch(payload: &[u8]) -> Result<ListEntitiesSwitchResponse, WireError> {
    let mut msg = ListEntitiesSwitchResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.object_id = value.string(num)?,
            2 => msg.key = value.fixed32(num)?,
            3 => msg.name = value.string(num)?,
            4 => msg.unique_id = value.string(num)?,
            5 => msg.icon = value.string(num)?,
            6 => msg.assumed_state = value.bool(num)?,
            7 => msg.disabled_by_default = value.bool(num)?,
            8 => msg.entity_category = EntityCategory::from_u32(value.u32(num)?),
            9 => msg.device_class = value.string(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_binary_sensor_state(payload: &[u8]) -> Result<BinarySensorStateResponse, WireError> {
    let mut msg = BinarySensorStateResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.key = value.fixed32(num)?,
            2 => msg.state = value.bool(num)?,
            3 => msg.missing_state = value.bool(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_switch_state(payload: &[u8]) -> Result<SwitchStateResponse, WireError> {
    let mut msg = SwitchStateResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.key = value.fixed32(num)?,
            2 => msg.state = value.bool(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_subscribe_logs_request(payload: &[u8]) -> Result<SubscribeLogsRequest, WireError> {
    let mut msg = SubscribeLogsRequest::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.level = LogLevel::from_u32(value.u32(num)?),
            2 => msg.dump_config = value.bool(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_subscribe_logs_response(payload: &[u8]) -> Result<SubscribeLogsResponse, WireError> {
    let mut msg = SubscribeLogsResponse::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.level = LogLevel::from_u32(value.u32(num)?),
            3 => msg.message = value.bytes(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

fn decode_switch_command(payload: &[u8]) -> Result<SwitchCommandRequest, WireError> {
    let mut msg = SwitchCommandRequest::default();
    for field in FieldReader::new(payload) {
        let (num, value) = field?;
        match num {
            1 => msg.key = value.fixed32(num)?,
            2 => msg.state = value.bool(num)?,
            _ => {}
        }
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(msg: ApiMessage) -> ApiMessage {
        let payload = msg.encode_payload();
        ApiMessage::decode(msg.type_id(), &payload)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn should_return_none_for_unregistered_type_id() {
        assert_eq!(ApiMessage::decode(9999, &[]).unwrap(), None);
    }

    #[test]
    fn should_error_for_malformed_payload_of_known_type() {
        // HelloRequest with a truncated length-delimited field.
        let err = ApiMessage::decode(type_id::HELLO_REQUEST, &[0x0A, 0x20, 0x01]).unwrap_err();
        assert_eq!(err.type_id, type_id::HELLO_REQUEST);
    }

    #[test]
    fn should_decode_empty_payload_for_field_less_messages() {
        assert_eq!(
            ApiMessage::decode(type_id::PING_REQUEST, &[]).unwrap(),
            Some(ApiMessage::PingRequest)
        );
        assert_eq!(
            ApiMessage::decode(type_id::LIST_ENTITIES_REQUEST, &[]).unwrap(),
            Some(ApiMessage::ListEntitiesRequest)
        );
    }

    #[test]
    fn should_roundtrip_hello_exchange() {
        let req = roundtrip(ApiMessage::HelloRequest(HelloRequest {
            client_info: "aioesphomeapi".to_string(),
            api_version_major: 1,
            api_version_minor: 10,
        }));
        assert_eq!(
            req,
            ApiMessage::HelloRequest(HelloRequest {
                client_info: "aioesphomeapi".to_string(),
                api_version_major: 1,
                api_version_minor: 10,
            })
        );
    }

    #[test]
    fn should_encode_switch_command_key_as_fixed32() {
        let msg = ApiMessage::SwitchCommandRequest(SwitchCommandRequest { key: 2, state: true });
        // field 1 fixed32 tag = 0x0D, then LE key, field 2 varint tag = 0x10.
        assert_eq!(
            msg.encode_payload(),
            vec![0x0D, 0x02, 0x00, 0x00, 0x00, 0x10, 0x01]
        );
    }

    #[test]
    fn should_decode_binary_sensor_state_from_reference_bytes() {
        let payload = [0x0D, 0x01, 0x00, 0x00, 0x00, 0x10, 0x01];
        let msg = ApiMessage::decode(type_id::BINARY_SENSOR_STATE_RESPONSE, &payload)
            .unwrap()
            .unwrap();
        assert_eq!(
            msg,
            ApiMessage::BinarySensorStateResponse(BinarySensorStateResponse {
                key: 1,
                state: true,
                missing_state: false,
            })
        );
    }

    #[test]
    fn should_roundtrip_descriptor_with_category() {
        let msg = roundtrip(ApiMessage::ListEntitiesBinarySensorResponse(
            ListEntitiesBinarySensorResponse {
                object_id: "motion".to_string(),
                key: 1,
                name: "Motion".to_string(),
                unique_id: "0123456789abcdef".to_string(),
                device_class: "motion".to_string(),
                is_status_binary_sensor: false,
                disabled_by_default: false,
                icon: "mdi:motion-sensor".to_string(),
                entity_category: EntityCategory::Diagnostic,
            },
        ));
        let ApiMessage::ListEntitiesBinarySensorResponse(decoded) = msg else {
            panic!("wrong variant");
        };
        assert_eq!(decoded.entity_category, EntityCategory::Diagnostic);
        assert_eq!(decoded.icon, "mdi:motion-sensor");
    }

    #[test]
    fn should_roundtrip_subscribe_logs_exchange() {
        let msg = roundtrip(ApiMessage::SubscribeLogsRequest(SubscribeLogsRequest {
            level: LogLevel::Debug,
            dump_config: true,
        }));
        assert_eq!(
            msg,
            ApiMessage::SubscribeLogsRequest(SubscribeLogsRequest {
                level: LogLevel::Debug,
                dump_config: true,
            })
        );

        let msg = roundtrip(ApiMessage::SubscribeLogsResponse(SubscribeLogsResponse {
            level: LogLevel::Info,
            message: b"[I][api] hello".to_vec(),
        }));
        let ApiMessage::SubscribeLogsResponse(decoded) = msg else {
            panic!("wrong variant");
        };
        assert_eq!(decoded.message, b"[I][api] hello");
    }

    #[test]
    fn should_expose_entity_key_for_addressed_messages() {
        let cmd = ApiMessage::SwitchCommandRequest(SwitchCommandRequest { key: 4, state: false });
        assert_eq!(cmd.entity_key(), Some(EntityKey::new(4)));
        assert_eq!(ApiMessage::PingRequest.entity_key(), None);
    }

    #[test]
    fn should_skip_unknown_fields_when_decoding() {
        // ConnectRequest with an unknown varint field 15 plus password.
        let mut payload = vec![0x78, 0x2A]; // field 15, varint 42
        payload.extend_from_slice(&[0x0A, 0x02, b'h', b'i']);
        let msg = ApiMessage::decode(type_id::CONNECT_REQUEST, &payload)
            .unwrap()
            .unwrap();
        assert_eq!(
            msg,
            ApiMessage::ConnectRequest(ConnectRequest {
                password: "hi".to_string(),
            })
        );
    }
}

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;
use crate::room::Member;
use crate::types::ConnectionId;

/// Wire protocol: one JSON envelope per line.
///
///   {"event": "join_room", "data": {"userName": "Alice", "roomId": "r1"}}
///   {"event": "spin", "data": {"roomId": "r1", "bet": 10, "payout": 0}}
///
/// Server-to-client events use the same envelope (`room_update`,
/// `remote_spin`, `error`).
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Payload of `join_room`. Every field is optional; nothing is validated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Payload of `spin`. `bet` and `payout` are relayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spin {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub bet: Value,
    #[serde(default)]
    pub payout: Value,
}

/// An event sent by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinRoom(JoinRoom),
    Spin(Spin),
}

/// An event sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomUpdate(Vec<Member>),
    #[serde(rename_all = "camelCase")]
    RemoteSpin {
        player_id: ConnectionId,
        bet: Value,
        payout: Value,
    },
    Error {
        message: String,
    },
}

/// Parse a single line into a ClientEvent.
pub fn parse_event(line: &str) -> Result<ClientEvent, RelayError> {
    let envelope: Envelope = serde_json::from_str(line.trim())
        .map_err(|e| RelayError::InvalidPayload(format!("malformed envelope: {e}")))?;

    match envelope.event.as_str() {
        "join_room" => payload(envelope.data).map(ClientEvent::JoinRoom),
        "spin" => payload(envelope.data).map(ClientEvent::Spin),
        other => Err(RelayError::InvalidPayload(format!("unknown event: {other}"))),
    }
}

/// A missing or null `data` means "all defaults". Anything else must be an object.
fn payload<T: Default + DeserializeOwned>(data: Value) -> Result<T, RelayError> {
    if data.is_null() {
        return Ok(T::default());
    }
    if !data.is_object() {
        return Err(RelayError::InvalidPayload(
            "event data must be an object".to_string(),
        ));
    }
    serde_json::from_value(data).map_err(|e| RelayError::InvalidPayload(e.to_string()))
}

impl ServerEvent {
    /// Encode as one newline-terminated line.
    pub fn encode(&self) -> Result<String, RelayError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

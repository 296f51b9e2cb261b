use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::Display;
use thiserror::Error;
use tracing::error;

use crate::room::models::{Participant, Role, RoomModel};
use crate::signaling::{ControlKind, SignalKind};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MessageType {
    // Client -> Server
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    ToggleMic,
    ToggleCamera,
    RaiseHand,

    // Both directions
    Offer,
    Answer,
    IceCandidate,

    // Server -> Client
    Connected,
    RoomCreated,
    RoomJoined,
    UserJoined,
    RoomFullOrInvalid,
    PeerLeft,
    PeerMicToggle,
    PeerCameraToggle,
    PeerHandToggle,
    NotDelivered,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
    pub connection_id: Option<String>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequestPayload {
    pub room_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescriptionPayload {
    pub target: String,
    pub sdp: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceCandidatePayload {
    pub target: String,
    pub candidate: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleMicPayload {
    pub room_id: String,
    pub is_muted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleCameraPayload {
    pub room_id: String,
    pub is_off: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaiseHandPayload {
    pub room_id: String,
    pub is_raised: bool,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub connection_id: String,
}

/// Sent to the creator (room-created) and to the joiner (room-joined)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatePayload {
    pub room_id: String,
    pub role: Role,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedPayload {
    pub joiner_id: String,
    pub joiner_name: String,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomFullOrInvalidPayload {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerLeftPayload {
    pub disconnected_user_id: String,
    pub disconnected_user_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotDeliveredPayload {
    pub target: String,
    pub event: MessageType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Inbound messages that could not be turned into a client event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid message: {0}")]
    InvalidEnvelope(String),

    #[error("Malformed {event} payload: {reason}")]
    MalformedPayload { event: MessageType, reason: String },

    #[error("Event {0} cannot be sent by clients")]
    UnexpectedType(MessageType),
}

/// A validated client-to-server event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    CreateRoom {
        room_id: String,
        name: String,
    },
    JoinRoom {
        room_id: String,
        name: String,
    },
    LeaveRoom {
        room_id: String,
    },
    Signal {
        kind: SignalKind,
        target: String,
        payload: Value,
    },
    Control {
        kind: ControlKind,
        room_id: String,
        value: bool,
    },
}

impl ClientEvent {
    /// Parses a raw text frame into a client event
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let message: WebSocketMessage = serde_json::from_str(raw)
            .map_err(|e| ProtocolError::InvalidEnvelope(e.to_string()))?;
        Self::from_message(message)
    }

    pub fn from_message(message: WebSocketMessage) -> Result<Self, ProtocolError> {
        let event = message.message_type;
        let payload = message.payload;

        match event {
            MessageType::CreateRoom | MessageType::JoinRoom => {
                let p: RoomRequestPayload = decode(event, payload)?;
                let room_id = require_non_empty(event, "roomId", p.room_id)?;
                if event == MessageType::CreateRoom {
                    Ok(ClientEvent::CreateRoom {
                        room_id,
                        name: p.name,
                    })
                } else {
                    Ok(ClientEvent::JoinRoom {
                        room_id,
                        name: p.name,
                    })
                }
            }
            MessageType::LeaveRoom => {
                let p: LeaveRoomPayload = decode(event, payload)?;
                Ok(ClientEvent::LeaveRoom {
                    room_id: require_non_empty(event, "roomId", p.room_id)?,
                })
            }
            MessageType::Offer | MessageType::Answer => {
                let p: SessionDescriptionPayload = decode(event, payload)?;
                let kind = if event == MessageType::Offer {
                    SignalKind::Offer
                } else {
                    SignalKind::Answer
                };
                signal(event, kind, p.target, p.sdp)
            }
            MessageType::IceCandidate => {
                let p: IceCandidatePayload = decode(event, payload)?;
                signal(event, SignalKind::IceCandidate, p.target, p.candidate)
            }
            MessageType::ToggleMic => {
                let p: ToggleMicPayload = decode(event, payload)?;
                control(event, ControlKind::Mic, p.room_id, p.is_muted)
            }
            MessageType::ToggleCamera => {
                let p: ToggleCameraPayload = decode(event, payload)?;
                control(event, ControlKind::Camera, p.room_id, p.is_off)
            }
            MessageType::RaiseHand => {
                let p: RaiseHandPayload = decode(event, payload)?;
                control(event, ControlKind::Hand, p.room_id, p.is_raised)
            }
            other => Err(ProtocolError::UnexpectedType(other)),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            ClientEvent::CreateRoom { .. } => MessageType::CreateRoom,
            ClientEvent::JoinRoom { .. } => MessageType::JoinRoom,
            ClientEvent::LeaveRoom { .. } => MessageType::LeaveRoom,
            ClientEvent::Signal { kind, .. } => kind.message_type(),
            ClientEvent::Control { kind, .. } => kind.request_type(),
        }
    }
}

fn decode<T: DeserializeOwned>(event: MessageType, payload: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|e| ProtocolError::MalformedPayload {
        event,
        reason: e.to_string(),
    })
}

fn require_non_empty(
    event: MessageType,
    field: &str,
    value: String,
) -> Result<String, ProtocolError> {
    if value.trim().is_empty() {
        return Err(ProtocolError::MalformedPayload {
            event,
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(value)
}

fn signal(
    event: MessageType,
    kind: SignalKind,
    target: String,
    payload: Value,
) -> Result<ClientEvent, ProtocolError> {
    let target = require_non_empty(event, "target", target)?;
    if payload.is_null() {
        return Err(ProtocolError::MalformedPayload {
            event,
            reason: format!("{} must not be null", kind.payload_field()),
        });
    }
    Ok(ClientEvent::Signal {
        kind,
        target,
        payload,
    })
}

fn control(
    event: MessageType,
    kind: ControlKind,
    room_id: String,
    value: bool,
) -> Result<ClientEvent, ProtocolError> {
    Ok(ClientEvent::Control {
        kind,
        room_id: require_non_empty(event, "roomId", room_id)?,
        value,
    })
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                connection_id: None,
            }),
        }
    }

    /// Copy of the message with `meta.connectionId` set to the connection it is delivered on
    pub fn addressed_to(&self, connection_id: &str) -> Self {
        let timestamp = self
            .meta
            .as_ref()
            .map(|meta| meta.timestamp)
            .unwrap_or_else(Utc::now);

        Self {
            message_type: self.message_type,
            payload: self.payload.clone(),
            meta: Some(WebSocketMessageMeta {
                timestamp,
                connection_id: Some(connection_id.to_string()),
            }),
        }
    }

    fn with_payload<T: Serialize>(message_type: MessageType, payload: T) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or_else(|e| {
            error!(message_type = %message_type, error = %e, "Failed to encode payload");
            Value::Null
        });
        Self::new(message_type, payload)
    }

    /// Create a CONNECTED message carrying the client's own connection id
    pub fn connected(connection_id: &str) -> Self {
        Self::with_payload(
            MessageType::Connected,
            ConnectedPayload {
                connection_id: connection_id.to_string(),
            },
        )
    }

    pub fn room_created(room: &RoomModel, role: Role) -> Self {
        Self::with_payload(MessageType::RoomCreated, Self::room_state(room, role))
    }

    pub fn room_joined(room: &RoomModel, role: Role) -> Self {
        Self::with_payload(MessageType::RoomJoined, Self::room_state(room, role))
    }

    fn room_state(room: &RoomModel, role: Role) -> RoomStatePayload {
        RoomStatePayload {
            room_id: room.id.clone(),
            role,
            participants: room.participants.clone(),
        }
    }

    pub fn user_joined(joiner: &Participant, participants: Vec<Participant>) -> Self {
        Self::with_payload(
            MessageType::UserJoined,
            UserJoinedPayload {
                joiner_id: joiner.id.clone(),
                joiner_name: joiner.name.clone(),
                participants,
            },
        )
    }

    pub fn room_full_or_invalid(reason: String) -> Self {
        Self::with_payload(
            MessageType::RoomFullOrInvalid,
            RoomFullOrInvalidPayload { reason },
        )
    }

    pub fn peer_left(departed: &Participant) -> Self {
        Self::with_payload(
            MessageType::PeerLeft,
            PeerLeftPayload {
                disconnected_user_id: departed.id.clone(),
                disconnected_user_name: departed.name.clone(),
            },
        )
    }

    /// Forwarded offer/answer/ice-candidate: `{<sdp|candidate>, sender}`
    pub fn signal(kind: SignalKind, sender_id: &str, payload: Value) -> Self {
        let mut body = Map::new();
        body.insert(kind.payload_field().to_string(), payload);
        body.insert("sender".to_string(), Value::String(sender_id.to_string()));
        Self::new(kind.message_type(), Value::Object(body))
    }

    /// Control toggle as seen by the other room members: `{senderId, <isMuted|isOff|isRaised>}`
    pub fn peer_control(kind: ControlKind, sender_id: &str, value: bool) -> Self {
        let mut body = Map::new();
        body.insert(
            "senderId".to_string(),
            Value::String(sender_id.to_string()),
        );
        body.insert(kind.value_field().to_string(), Value::Bool(value));
        Self::new(kind.broadcast_type(), Value::Object(body))
    }

    pub fn not_delivered(target: &str, event: MessageType) -> Self {
        Self::with_payload(
            MessageType::NotDelivered,
            NotDeliveredPayload {
                target: target.to_string(),
                event,
            },
        )
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Self {
        Self::with_payload(MessageType::Error, ErrorPayload { message })
    }
}

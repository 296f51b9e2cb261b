use serde_json::Value;
use strum_macros::EnumIter;

use crate::websockets::MessageType;

/// Session-description and connectivity-candidate exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    /// Event name used both inbound and when forwarded to the target
    pub fn message_type(self) -> MessageType {
        match self {
            SignalKind::Offer => MessageType::Offer,
            SignalKind::Answer => MessageType::Answer,
            SignalKind::IceCandidate => MessageType::IceCandidate,
        }
    }

    /// Name of the field carrying the opaque payload
    pub fn payload_field(self) -> &'static str {
        match self {
            SignalKind::Offer | SignalKind::Answer => "sdp",
            SignalKind::IceCandidate => "candidate",
        }
    }
}

/// A signaling payload routed once from `sender_id` to `target_id`, never stored
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingMessage {
    pub kind: SignalKind,
    pub sender_id: String,
    pub target_id: String,
    pub payload: Value,
}

/// In-call toggles broadcast to the rest of the sender's room
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ControlKind {
    Mic,
    Camera,
    Hand,
}

impl ControlKind {
    pub fn request_type(self) -> MessageType {
        match self {
            ControlKind::Mic => MessageType::ToggleMic,
            ControlKind::Camera => MessageType::ToggleCamera,
            ControlKind::Hand => MessageType::RaiseHand,
        }
    }

    pub fn broadcast_type(self) -> MessageType {
        match self {
            ControlKind::Mic => MessageType::PeerMicToggle,
            ControlKind::Camera => MessageType::PeerCameraToggle,
            ControlKind::Hand => MessageType::PeerHandToggle,
        }
    }

    /// Field name carrying the toggle value, identical in request and broadcast
    pub fn value_field(self) -> &'static str {
        match self {
            ControlKind::Mic => "isMuted",
            ControlKind::Camera => "isOff",
            ControlKind::Hand => "isRaised",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEvent {
    pub kind: ControlKind,
    pub room_id: String,
    pub sender_id: String,
    pub value: bool,
}

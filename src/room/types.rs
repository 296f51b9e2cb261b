use serde::{Deserialize, Serialize};

/// Response body for GET /health
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub rooms: usize,
    pub connections: usize,
}

/// Response body for GET /room-code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomCodeResponse {
    pub room_id: String,
}

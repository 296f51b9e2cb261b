use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::models::{Participant, RoomModel};

/// Failures of registry operations, reported only to the client that caused them
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room already exists")]
    RoomAlreadyExists,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    /// The connection already sits in the named room
    #[error("Already in a room")]
    AlreadyInRoom(String),
}

/// Result of a successful join
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    /// Room state after the join, in seat order
    pub room: RoomModel,
    /// The joiner's seated record, including its assigned role
    pub participant: Participant,
}

/// Result of attempting to remove a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveRoomResult {
    /// Participant removed, other members remain
    Left {
        departed: Participant,
        room: RoomModel,
    },
    /// Participant removed and the room was deleted because nobody is left
    RoomDeleted {
        departed: Participant,
        room_id: String,
    },
    /// Room or participant absent; nothing changed
    NotInRoom,
}

/// Room registry operations. Every method is atomic with respect to the others.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Creates a one-member room owned by `connection_id`
    async fn create_room(
        &self,
        room_id: &str,
        connection_id: &str,
        name: &str,
    ) -> Result<RoomModel, RoomError>;

    /// Appends `connection_id` to an existing room with a free seat
    async fn join_room(
        &self,
        room_id: &str,
        connection_id: &str,
        name: &str,
    ) -> Result<JoinedRoom, RoomError>;

    /// Removes a participant from a specific room. Absent room or participant is a no-op.
    async fn remove_participant(&self, room_id: &str, connection_id: &str) -> LeaveRoomResult;

    /// Removes a connection from whichever room it sits in
    async fn remove_connection(&self, connection_id: &str) -> LeaveRoomResult;

    async fn get_room(&self, room_id: &str) -> Option<RoomModel>;

    /// Room the connection currently sits in
    async fn room_of(&self, connection_id: &str) -> Option<String>;

    /// The connection's current room id and the ids of its other members
    async fn peers_of(&self, connection_id: &str) -> Option<(String, Vec<String>)>;

    async fn room_count(&self) -> usize;
}

#[derive(Default)]
struct RegistryState {
    rooms: HashMap<String, RoomModel>,
    // connection_id -> room_id, updated together with `rooms`
    connection_rooms: HashMap<String, String>,
}

impl RegistryState {
    fn remove(&mut self, room_id: &str, connection_id: &str) -> LeaveRoomResult {
        let Some(room) = self.rooms.get_mut(room_id) else {
            debug!(room_id = %room_id, connection_id = %connection_id, "Room not found");
            return LeaveRoomResult::NotInRoom;
        };

        let Some(departed) = room.remove_participant(connection_id) else {
            debug!(room_id = %room_id, connection_id = %connection_id, "Participant not in room");
            return LeaveRoomResult::NotInRoom;
        };
        self.connection_rooms.remove(connection_id);

        if room.is_empty() {
            info!(room_id = %room_id, "Room is now empty, deleting");
            self.rooms.remove(room_id);
            return LeaveRoomResult::RoomDeleted {
                departed,
                room_id: room_id.to_string(),
            };
        }

        info!(
            room_id = %room_id,
            connection_id = %connection_id,
            remaining = room.participant_count(),
            "Participant removed from room"
        );

        LeaveRoomResult::Left {
            departed,
            room: room.clone(),
        }
    }
}

/// In-memory registry, owned by the service and lost on restart
pub struct InMemoryRoomRepository {
    state: Mutex<RegistryState>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self))]
    async fn create_room(
        &self,
        room_id: &str,
        connection_id: &str,
        name: &str,
    ) -> Result<RoomModel, RoomError> {
        let mut state = self.state.lock().await;

        if let Some(current) = state.connection_rooms.get(connection_id) {
            debug!(current_room = %current, "Connection already seated");
            return Err(RoomError::AlreadyInRoom(current.clone()));
        }
        if state.rooms.contains_key(room_id) {
            debug!("Room already exists");
            return Err(RoomError::RoomAlreadyExists);
        }

        let room = RoomModel::new(room_id, connection_id, name);
        state.rooms.insert(room_id.to_string(), room.clone());
        state
            .connection_rooms
            .insert(connection_id.to_string(), room_id.to_string());

        info!("Room created");
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn join_room(
        &self,
        room_id: &str,
        connection_id: &str,
        name: &str,
    ) -> Result<JoinedRoom, RoomError> {
        let mut state = self.state.lock().await;

        if let Some(current) = state.connection_rooms.get(connection_id) {
            debug!(current_room = %current, "Connection already seated");
            return Err(RoomError::AlreadyInRoom(current.clone()));
        }

        let room = state.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        if room.is_full() {
            debug!(current_count = room.participant_count(), "Room is full");
            return Err(RoomError::RoomFull);
        }

        let participant = room.seat(connection_id, name);
        let room = room.clone();
        state
            .connection_rooms
            .insert(connection_id.to_string(), room_id.to_string());

        info!(
            role = %participant.role,
            new_count = room.participant_count(),
            "Participant joined room"
        );

        Ok(JoinedRoom { room, participant })
    }

    #[instrument(skip(self))]
    async fn remove_participant(&self, room_id: &str, connection_id: &str) -> LeaveRoomResult {
        self.state.lock().await.remove(room_id, connection_id)
    }

    #[instrument(skip(self))]
    async fn remove_connection(&self, connection_id: &str) -> LeaveRoomResult {
        let mut state = self.state.lock().await;
        match state.connection_rooms.get(connection_id).cloned() {
            Some(room_id) => state.remove(&room_id, connection_id),
            None => {
                debug!("Connection not seated in any room");
                LeaveRoomResult::NotInRoom
            }
        }
    }

    async fn get_room(&self, room_id: &str) -> Option<RoomModel> {
        self.state.lock().await.rooms.get(room_id).cloned()
    }

    async fn room_of(&self, connection_id: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .connection_rooms
            .get(connection_id)
            .cloned()
    }

    async fn peers_of(&self, connection_id: &str) -> Option<(String, Vec<String>)> {
        let state = self.state.lock().await;
        let room_id = state.connection_rooms.get(connection_id)?;
        let room = state.rooms.get(room_id)?;
        Some((room_id.clone(), room.other_participant_ids(connection_id)))
    }

    async fn room_count(&self) -> usize {
        self.state.lock().await.rooms.len()
    }
}

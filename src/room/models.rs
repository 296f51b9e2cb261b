use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Maximum number of participants a room can hold
pub const ROOM_CAPACITY: usize = 2;

/// Length of generated room codes
pub const ROOM_CODE_LENGTH: usize = 6;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Role of a participant, fixed by the seat they took when entering the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Role {
    Interviewer,
    Interviewee,
}

impl Role {
    /// Role bound to a seat index: index 0 interviews, index 1 is interviewed
    pub fn for_position(position: usize) -> Self {
        if position == 0 {
            Role::Interviewer
        } else {
            Role::Interviewee
        }
    }
}

/// A named occupant of a room, bound to one connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Connection identifier of the occupant
    pub id: String,
    /// Display name supplied by the client
    pub name: String,
    pub role: Role,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// In-memory room state: a code plus the ordered seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: String,
    pub participants: Vec<Participant>,
}

impl RoomModel {
    /// Creates a room with its creator in the first seat
    pub fn new(id: impl Into<String>, creator_id: &str, creator_name: &str) -> Self {
        Self {
            id: id.into(),
            participants: vec![Participant::new(
                creator_id,
                creator_name,
                Role::for_position(0),
            )],
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Check if room is at capacity (2 participants)
    pub fn is_full(&self) -> bool {
        self.participants.len() >= ROOM_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn has_participant(&self, connection_id: &str) -> bool {
        self.participants.iter().any(|p| p.id == connection_id)
    }

    pub fn participant(&self, connection_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == connection_id)
    }

    /// Connection ids of every member except the given one
    pub fn other_participant_ids(&self, connection_id: &str) -> Vec<String> {
        self.participants
            .iter()
            .filter(|p| p.id != connection_id)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Appends a participant into the next free seat and returns the seated record.
    /// Callers check capacity first.
    pub fn seat(&mut self, connection_id: &str, name: &str) -> Participant {
        let participant = Participant::new(
            connection_id,
            name,
            Role::for_position(self.participants.len()),
        );
        self.participants.push(participant.clone());
        participant
    }

    /// Removes a participant, keeping the remaining members in their original order
    pub fn remove_participant(&mut self, connection_id: &str) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == connection_id)?;
        Some(self.participants.remove(index))
    }
}

/// Generates a random code in the same shape clients use (6 chars, A-Z0-9)
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[index] as char
        })
        .collect()
}

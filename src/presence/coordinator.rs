use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::room::models::Role;
use crate::room::repository::{LeaveRoomResult, RoomRepository};
use crate::websockets::{ConnectionManager, Delivery, MessageBroadcaster, WebSocketMessage};

/// Room session state machine: Empty -> Created -> Paired and back.
///
/// The only component that mutates the room registry. Every operation returns
/// the notifications it queued so callers can assert on delivery.
pub struct PresenceCoordinator {
    repository: Arc<dyn RoomRepository>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl PresenceCoordinator {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            repository,
            connection_manager,
        }
    }

    /// Empty -> Created. Only the creator is notified.
    #[instrument(skip(self))]
    pub async fn create_room(
        &self,
        connection_id: &str,
        room_id: &str,
        name: &str,
    ) -> Vec<Delivery> {
        match self.repository.create_room(room_id, connection_id, name).await {
            Ok(room) => {
                let role = room
                    .participant(connection_id)
                    .map(|p| p.role)
                    .unwrap_or_else(|| Role::for_position(0));
                info!(role = %role, "Room created");

                let message = WebSocketMessage::room_created(&room, role);
                vec![self.send(connection_id, &message).await]
            }
            Err(e) => {
                warn!(error = %e, "Room creation rejected");
                let message = WebSocketMessage::error(e.to_string());
                vec![self.send(connection_id, &message).await]
            }
        }
    }

    /// Created -> Paired. The joiner gets its role and the member list; the existing
    /// member gets `user-joined`, which makes it the one that starts the offer.
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        connection_id: &str,
        room_id: &str,
        name: &str,
    ) -> Vec<Delivery> {
        let joined = match self.repository.join_room(room_id, connection_id, name).await {
            Ok(joined) => joined,
            Err(e) => {
                warn!(error = %e, "Join rejected");
                let message = WebSocketMessage::room_full_or_invalid(e.to_string());
                return vec![self.send(connection_id, &message).await];
            }
        };

        info!(role = %joined.participant.role, "Participant joined");

        let mut deliveries = Vec::new();
        let reply = WebSocketMessage::room_joined(&joined.room, joined.participant.role);
        deliveries.push(self.send(connection_id, &reply).await);

        let peers = joined.room.other_participant_ids(connection_id);
        let notice =
            WebSocketMessage::user_joined(&joined.participant, joined.room.participants.clone());
        deliveries.extend(
            MessageBroadcaster::broadcast(&self.connection_manager, &peers, &notice).await,
        );

        deliveries
    }

    /// Explicit leave from a named room. A second attempt is a silent no-op.
    #[instrument(skip(self))]
    pub async fn leave_room(&self, connection_id: &str, room_id: &str) -> Vec<Delivery> {
        let result = self
            .repository
            .remove_participant(room_id, connection_id)
            .await;
        self.notify_departure(connection_id, result).await
    }

    /// Transport-level departure; the room is found through the registry's reverse index.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, connection_id: &str) -> Vec<Delivery> {
        let result = self.repository.remove_connection(connection_id).await;
        self.notify_departure(connection_id, result).await
    }

    /// Members that should receive a control event sent by `connection_id` for `room_id`.
    /// None when the sender does not currently sit in that room.
    pub async fn control_recipients(
        &self,
        connection_id: &str,
        room_id: &str,
    ) -> Option<Vec<String>> {
        match self.repository.peers_of(connection_id).await {
            Some((current_room, peers)) if current_room == room_id => Some(peers),
            Some((current_room, _)) => {
                warn!(
                    connection_id = %connection_id,
                    room_id = %room_id,
                    current_room = %current_room,
                    "Control event names a room the sender is not in"
                );
                None
            }
            None => {
                debug!(connection_id = %connection_id, "Control event from unseated connection");
                None
            }
        }
    }

    async fn notify_departure(
        &self,
        connection_id: &str,
        result: LeaveRoomResult,
    ) -> Vec<Delivery> {
        match result {
            LeaveRoomResult::Left { departed, room } => {
                info!(
                    room_id = %room.id,
                    departed = %departed.name,
                    remaining = room.participant_count(),
                    "Paired -> Created, notifying remaining member"
                );
                let message = WebSocketMessage::peer_left(&departed);
                let remaining = room.other_participant_ids(connection_id);
                MessageBroadcaster::broadcast(&self.connection_manager, &remaining, &message).await
            }
            LeaveRoomResult::RoomDeleted { room_id, .. } => {
                info!(room_id = %room_id, "Last member left, room deleted");
                Vec::new()
            }
            LeaveRoomResult::NotInRoom => {
                debug!(connection_id = %connection_id, "Departure already handled");
                Vec::new()
            }
        }
    }

    async fn send(&self, recipient: &str, message: &WebSocketMessage) -> Delivery {
        MessageBroadcaster::send(&self.connection_manager, recipient, message).await
    }
}

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{
    bus::{DispatchReport, GatewayHandle, QueuedEvent},
    events::GatewayEvent,
};
use crate::presence::PresenceCoordinator;
use crate::room::repository::RoomRepository;
use crate::signaling::{ControlEvent, SignalingMessage, SignalingRelay};
use crate::websockets::{
    ClientEvent, ConnectionManager, Delivery, MessageBroadcaster, WebSocketMessage,
};

/// Routes gateway events to the presence coordinator and the signaling relay.
///
/// A single task drains the queue, so no two events are ever handled concurrently
/// and every outbound message for one event is queued before the next event starts.
pub struct EventDispatcher {
    connection_manager: Arc<dyn ConnectionManager>,
    coordinator: PresenceCoordinator,
    relay: SignalingRelay,
}

impl EventDispatcher {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
        report_undelivered: bool,
    ) -> Self {
        Self {
            coordinator: PresenceCoordinator::new(room_repository, connection_manager.clone()),
            relay: SignalingRelay::new(connection_manager.clone(), report_undelivered),
            connection_manager,
        }
    }

    /// Starts the dispatch loop. It stops once every `GatewayHandle` has been dropped.
    pub fn spawn(self) -> (GatewayHandle, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<QueuedEvent>();

        let task = tokio::spawn(async move {
            info!("Starting event dispatcher");

            while let Some(QueuedEvent { event, reply }) = receiver.recv().await {
                let report = self.dispatch(event).await;
                if let Some(reply) = reply {
                    // Submitter may have stopped waiting
                    let _ = reply.send(report);
                }
            }

            info!("Event dispatcher stopped listening");
        });

        (GatewayHandle::new(sender), task)
    }

    /// Handles one event to completion
    #[instrument(
        skip(self, event),
        fields(connection_id = %event.connection_id(), event_type = event.event_type())
    )]
    pub async fn dispatch(&self, event: GatewayEvent) -> DispatchReport {
        let deliveries = match event {
            GatewayEvent::Connected {
                connection_id,
                sender,
            } => self.handle_connected(connection_id, sender).await,
            GatewayEvent::Message { connection_id, raw } => {
                self.handle_message(&connection_id, &raw).await
            }
            GatewayEvent::Disconnected { connection_id } => {
                self.handle_disconnected(&connection_id).await
            }
        };

        DispatchReport::new(deliveries)
    }

    async fn handle_connected(
        &self,
        connection_id: String,
        sender: mpsc::UnboundedSender<String>,
    ) -> Vec<Delivery> {
        self.connection_manager
            .add_connection(connection_id.clone(), sender)
            .await;
        info!("Connection registered");

        let message = WebSocketMessage::connected(&connection_id);
        vec![MessageBroadcaster::send(&self.connection_manager, &connection_id, &message).await]
    }

    async fn handle_message(&self, connection_id: &str, raw: &str) -> Vec<Delivery> {
        let event = match ClientEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Rejected inbound message");
                let message = WebSocketMessage::error(e.to_string());
                return vec![
                    MessageBroadcaster::send(&self.connection_manager, connection_id, &message)
                        .await,
                ];
            }
        };

        debug!(message_type = %event.message_type(), "Routing client event");

        match event {
            ClientEvent::CreateRoom { room_id, name } => {
                self.coordinator
                    .create_room(connection_id, &room_id, &name)
                    .await
            }
            ClientEvent::JoinRoom { room_id, name } => {
                self.coordinator
                    .join_room(connection_id, &room_id, &name)
                    .await
            }
            ClientEvent::LeaveRoom { room_id } => {
                self.coordinator.leave_room(connection_id, &room_id).await
            }
            ClientEvent::Signal {
                kind,
                target,
                payload,
            } => {
                self.relay
                    .forward(SignalingMessage {
                        kind,
                        sender_id: connection_id.to_string(),
                        target_id: target,
                        payload,
                    })
                    .await
            }
            ClientEvent::Control {
                kind,
                room_id,
                value,
            } => {
                let Some(recipients) = self
                    .coordinator
                    .control_recipients(connection_id, &room_id)
                    .await
                else {
                    return Vec::new();
                };

                let event = ControlEvent {
                    kind,
                    room_id,
                    sender_id: connection_id.to_string(),
                    value,
                };
                self.relay.broadcast_control(&event, &recipients).await
            }
        }
    }

    async fn handle_disconnected(&self, connection_id: &str) -> Vec<Delivery> {
        if !self.connection_manager.remove_connection(connection_id).await {
            debug!("Connection was not registered");
        }
        let deliveries = self.coordinator.disconnect(connection_id).await;
        info!(notified = deliveries.len(), "Connection cleaned up");
        deliveries
    }
}

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::types::{ControlEvent, SignalingMessage};
use crate::websockets::{ConnectionManager, Delivery, MessageBroadcaster, WebSocketMessage};

/// Stateless forwarder of signaling payloads and control toggles.
/// Never reads or writes room state; recipients of control events are resolved by the caller.
pub struct SignalingRelay {
    connection_manager: Arc<dyn ConnectionManager>,
    report_undelivered: bool,
}

impl SignalingRelay {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, report_undelivered: bool) -> Self {
        Self {
            connection_manager,
            report_undelivered,
        }
    }

    /// Forwards `{payload, sender}` to the explicit target. Fire-and-forget: an absent
    /// target drops the message, optionally telling the sender with `not-delivered`.
    #[instrument(
        skip(self, message),
        fields(kind = ?message.kind, sender = %message.sender_id, target = %message.target_id)
    )]
    pub async fn forward(&self, message: SignalingMessage) -> Vec<Delivery> {
        let outbound = WebSocketMessage::signal(message.kind, &message.sender_id, message.payload);
        let delivery =
            MessageBroadcaster::send(&self.connection_manager, &message.target_id, &outbound).await;

        if delivery.is_delivered() {
            debug!("Signal forwarded");
            return vec![delivery];
        }

        warn!("Signal target not connected, dropping");
        let mut deliveries = vec![delivery];
        if self.report_undelivered {
            let notice =
                WebSocketMessage::not_delivered(&message.target_id, message.kind.message_type());
            deliveries.push(
                MessageBroadcaster::send(&self.connection_manager, &message.sender_id, &notice)
                    .await,
            );
        }
        deliveries
    }

    /// Sends a control toggle to the given room members. The sender is always skipped.
    #[instrument(
        skip(self, event, recipients),
        fields(kind = ?event.kind, room_id = %event.room_id, sender = %event.sender_id)
    )]
    pub async fn broadcast_control(
        &self,
        event: &ControlEvent,
        recipients: &[String],
    ) -> Vec<Delivery> {
        let recipients: Vec<String> = recipients
            .iter()
            .filter(|id| **id != event.sender_id)
            .cloned()
            .collect();

        let outbound = WebSocketMessage::peer_control(event.kind, &event.sender_id, event.value);
        let deliveries =
            MessageBroadcaster::broadcast(&self.connection_manager, &recipients, &outbound).await;

        debug!(recipients = deliveries.len(), "Control event broadcast");
        deliveries
    }
}

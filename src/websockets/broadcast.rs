use std::sync::Arc;
use tracing::{debug, error};

use super::{
    connection_manager::{ConnectionManager, DeliveryStatus},
    messages::{MessageType, WebSocketMessage},
};

/// Record of one outbound message produced while handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub message_type: MessageType,
    pub status: DeliveryStatus,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}

pub struct MessageBroadcaster;

impl MessageBroadcaster {
    pub async fn send(
        connection_manager: &Arc<dyn ConnectionManager>,
        recipient: &str,
        message: &WebSocketMessage,
    ) -> Delivery {
        let status = match serde_json::to_string(&message.addressed_to(recipient)) {
            Ok(message_json) => {
                connection_manager
                    .send_to_connection(recipient, &message_json)
                    .await
            }
            Err(e) => {
                error!(recipient = %recipient, error = %e, "Failed to serialize message");
                DeliveryStatus::NotDelivered
            }
        };

        debug!(
            recipient = %recipient,
            message_type = %message.message_type,
            status = ?status,
            "Outbound message queued"
        );

        Delivery {
            recipient: recipient.to_string(),
            message_type: message.message_type,
            status,
        }
    }

    pub async fn broadcast(
        connection_manager: &Arc<dyn ConnectionManager>,
        recipients: &[String],
        message: &WebSocketMessage,
    ) -> Vec<Delivery> {
        let mut deliveries = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            deliveries.push(Self::send(connection_manager, recipient, message).await);
        }
        deliveries
    }
}

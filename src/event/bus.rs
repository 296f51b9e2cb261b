use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::events::GatewayEvent;
use crate::websockets::{Delivery, MessageType};

/// Outcome of dispatching one gateway event: every outbound message it produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub deliveries: Vec<Delivery>,
}

impl DispatchReport {
    pub fn new(deliveries: Vec<Delivery>) -> Self {
        Self { deliveries }
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Message types sent to `recipient`, in send order
    pub fn sent_to(&self, recipient: &str) -> Vec<MessageType> {
        self.deliveries
            .iter()
            .filter(|d| d.recipient == recipient)
            .map(|d| d.message_type)
            .collect()
    }

    pub fn undelivered(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| !d.is_delivered())
    }
}

pub(crate) struct QueuedEvent {
    pub event: GatewayEvent,
    pub reply: Option<oneshot::Sender<DispatchReport>>,
}

/// Cloneable entry point into the dispatcher queue.
///
/// All connections share one queue, so events are handled strictly in the order
/// they were submitted.
#[derive(Debug, Clone)]
pub struct GatewayHandle {
    sender: mpsc::UnboundedSender<QueuedEvent>,
}

impl std::fmt::Debug for QueuedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedEvent")
            .field("event", &self.event)
            .field("awaits_reply", &self.reply.is_some())
            .finish()
    }
}

impl GatewayHandle {
    pub(crate) fn new(sender: mpsc::UnboundedSender<QueuedEvent>) -> Self {
        Self { sender }
    }

    pub fn connect(&self, connection_id: &str, sender: mpsc::UnboundedSender<String>) {
        self.enqueue(
            GatewayEvent::Connected {
                connection_id: connection_id.to_string(),
                sender,
            },
            None,
        );
    }

    pub fn message(&self, connection_id: &str, raw: String) {
        self.enqueue(
            GatewayEvent::Message {
                connection_id: connection_id.to_string(),
                raw,
            },
            None,
        );
    }

    pub fn disconnect(&self, connection_id: &str) {
        self.enqueue(
            GatewayEvent::Disconnected {
                connection_id: connection_id.to_string(),
            },
            None,
        );
    }

    /// Queues an event and returns a receiver resolved once it has been fully handled.
    /// The receiver errors if the dispatcher has stopped.
    pub fn submit(&self, event: GatewayEvent) -> oneshot::Receiver<DispatchReport> {
        let (reply, receiver) = oneshot::channel();
        self.enqueue(event, Some(reply));
        receiver
    }

    fn enqueue(&self, event: GatewayEvent, reply: Option<oneshot::Sender<DispatchReport>>) {
        let connection_id = event.connection_id().to_string();
        let event_type = event.event_type();

        match self.sender.send(QueuedEvent { event, reply }) {
            Ok(()) => debug!(connection_id = %connection_id, event_type, "Gateway event queued"),
            Err(_) => warn!(
                connection_id = %connection_id,
                event_type,
                "Dispatcher stopped, gateway event dropped"
            ),
        }
    }
}

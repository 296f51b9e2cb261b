use tokio::sync::mpsc;

/// Everything the gateway hands to the dispatcher, in arrival order.
///
/// Events represent facts at the transport level. The dispatcher turns them
/// into registry changes and outbound notifications one at a time.
#[derive(Debug)]
pub enum GatewayEvent {
    /// A socket was upgraded; `sender` feeds its outbound queue
    Connected {
        connection_id: String,
        sender: mpsc::UnboundedSender<String>,
    },

    /// A text frame arrived from a connection
    Message { connection_id: String, raw: String },

    /// The socket closed, errored or was dropped
    Disconnected { connection_id: String },
}

impl GatewayEvent {
    pub fn connection_id(&self) -> &str {
        match self {
            GatewayEvent::Connected { connection_id, .. }
            | GatewayEvent::Message { connection_id, .. }
            | GatewayEvent::Disconnected { connection_id } => connection_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            GatewayEvent::Connected { .. } => "connected",
            GatewayEvent::Message { .. } => "message",
            GatewayEvent::Disconnected { .. } => "disconnected",
        }
    }
}

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Text-frame transport under a relay connection
#[async_trait]
pub trait SocketWrapper: Send {
    async fn send_text(&mut self, frame: String) -> Result<(), SocketError>;

    /// Next text frame, or None once the peer has closed
    async fn next_text(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Receives every inbound text frame of a connection
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, connection_id: &str, message: String);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

/// Why a connection loop ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a close frame or the stream ended
    ClientClosed,
    /// The server side dropped the outbound queue
    OutboundClosed,
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_text(&mut self, frame: String) -> Result<(), SocketError> {
        self.send(Message::Text(frame))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
        while let Some(frame) = self.next().await {
            match frame.map_err(|e| SocketError::ReceiveFailed(e.to_string()))? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // axum answers pings itself; binary frames are not part of the protocol
                _ => continue,
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

enum Step {
    Outbound(Option<String>),
    Inbound(Result<Option<String>, SocketError>),
}

/// One client socket paired with its outbound queue.
/// Inbound frames go to the handler; queued frames go to the socket.
pub struct Connection {
    pub connection_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound: mpsc::UnboundedReceiver<String>,
    handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        connection_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound: mpsc::UnboundedReceiver<String>,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound,
            handler,
        }
    }

    /// Pumps frames both ways until either side closes
    pub async fn run(mut self) -> Result<CloseReason, SocketError> {
        let reason = loop {
            let step = tokio::select! {
                frame = self.outbound.recv() => Step::Outbound(frame),
                frame = self.socket.next_text() => Step::Inbound(frame),
            };

            match step {
                Step::Outbound(Some(frame)) => self.socket.send_text(frame).await?,
                Step::Outbound(None) => break CloseReason::OutboundClosed,
                Step::Inbound(Ok(Some(frame))) => {
                    self.handler.handle_message(&self.connection_id, frame).await
                }
                Step::Inbound(Ok(None)) => break CloseReason::ClientClosed,
                Step::Inbound(Err(e)) => return Err(e),
            }
        };

        if let Err(e) = self.socket.close().await {
            debug!(connection_id = %self.connection_id, error = %e, "Close frame not sent");
        }
        Ok(reason)
    }
}

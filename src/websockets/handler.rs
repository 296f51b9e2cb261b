use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::event::GatewayHandle;
use crate::shared::AppState;

use super::socket::{Connection, MessageHandler, SocketWrapper};

/// Message handler for receiving WebSocket messages from the client
///
/// Forwards raw frames into the gateway queue; parsing and routing happen in the dispatcher.
pub struct WebsocketReceiveHandler {
    gateway: GatewayHandle,
}

impl WebsocketReceiveHandler {
    pub fn new(gateway: GatewayHandle) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: &str, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        self.gateway.message(connection_id, message);
    }
}

/// WebSocket endpoint
/// GET /ws
#[instrument(name = "websocket_handler", skip_all)]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "WebSocket connection established");

    serve_connection(connection_id, Box::new(socket), app_state.gateway).await;
}

/// Registers the connection, pumps it until it ends, then queues exactly one departure
pub(crate) async fn serve_connection(
    connection_id: String,
    socket: Box<dyn SocketWrapper>,
    gateway: GatewayHandle,
) {
    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    gateway.connect(&connection_id, outbound_sender);

    let message_handler = Arc::new(WebsocketReceiveHandler::new(gateway.clone()));
    let connection = Connection::new(
        connection_id.clone(),
        socket,
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(reason) => {
            info!(connection_id = %connection_id, reason = ?reason, "WebSocket connection closed");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }

    // Exactly one departure per connection, whatever ended it
    gateway.disconnect(&connection_id);
}

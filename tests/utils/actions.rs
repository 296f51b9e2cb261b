use serde_json::{json, Value};

use interview_relay::{
    event::{DispatchReport, GatewayEvent},
    websockets::{MessageType, WebSocketMessage},
};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a WebSocket message and wait until the dispatcher has handled it
    pub async fn send_message(&self, client: &str, message: WebSocketMessage) -> DispatchReport {
        let raw = serde_json::to_string(&message).unwrap();
        self.send_raw(client, &raw).await
    }

    /// Send an arbitrary text frame
    pub async fn send_raw(&self, client: &str, raw: &str) -> DispatchReport {
        self.gateway
            .submit(GatewayEvent::Message {
                connection_id: client.to_string(),
                raw: raw.to_string(),
            })
            .await
            .expect("dispatcher should be running")
    }

    /// Queue a message the way a live socket does, without waiting for it to be handled
    pub fn queue_message(&self, client: &str, message: WebSocketMessage) {
        let raw = serde_json::to_string(&message).unwrap();
        self.gateway.message(client, raw);
    }

    /// Queue a socket close without waiting for it to be handled
    pub fn queue_disconnect(&self, client: &str) {
        self.gateway.disconnect(client);
    }

    /// Resolves once every event queued so far has been handled.
    /// The marker connection was never registered, so its departure is a no-op.
    pub async fn wait_until_idle(&self) {
        let report = self
            .gateway
            .submit(GatewayEvent::Disconnected {
                connection_id: "idle-marker".to_string(),
            })
            .await
            .expect("dispatcher should be running");
        assert!(report.is_empty());
    }

    /// Simulate the socket closing
    pub async fn disconnect(&self, client: &str) -> DispatchReport {
        let report = self
            .gateway
            .submit(GatewayEvent::Disconnected {
                connection_id: client.to_string(),
            })
            .await
            .expect("dispatcher should be running");
        self.clients.lock().await.remove(client);
        report
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn create_room(&self, client: &str, room_id: &str, name: &str) -> DispatchReport {
        self.send_message(
            client,
            WebSocketMessage::new(
                MessageType::CreateRoom,
                json!({ "roomId": room_id, "name": name }),
            ),
        )
        .await
    }

    pub async fn join_room(&self, client: &str, room_id: &str, name: &str) -> DispatchReport {
        self.send_message(
            client,
            WebSocketMessage::new(
                MessageType::JoinRoom,
                json!({ "roomId": room_id, "name": name }),
            ),
        )
        .await
    }

    pub async fn leave_room(&self, client: &str, room_id: &str) -> DispatchReport {
        self.send_message(
            client,
            WebSocketMessage::new(MessageType::LeaveRoom, json!({ "roomId": room_id })),
        )
        .await
    }

    pub async fn send_offer(&self, from: &str, target: &str, sdp: Value) -> DispatchReport {
        self.send_message(
            from,
            WebSocketMessage::new(MessageType::Offer, json!({ "target": target, "sdp": sdp })),
        )
        .await
    }

    pub async fn send_answer(&self, from: &str, target: &str, sdp: Value) -> DispatchReport {
        self.send_message(
            from,
            WebSocketMessage::new(MessageType::Answer, json!({ "target": target, "sdp": sdp })),
        )
        .await
    }

    pub async fn send_ice_candidate(
        &self,
        from: &str,
        target: &str,
        candidate: Value,
    ) -> DispatchReport {
        self.send_message(
            from,
            WebSocketMessage::new(
                MessageType::IceCandidate,
                json!({ "target": target, "candidate": candidate }),
            ),
        )
        .await
    }

    pub async fn toggle_mic(&self, client: &str, room_id: &str, is_muted: bool) -> DispatchReport {
        self.send_message(
            client,
            WebSocketMessage::new(
                MessageType::ToggleMic,
                json!({ "roomId": room_id, "isMuted": is_muted }),
            ),
        )
        .await
    }

    pub async fn toggle_camera(&self, client: &str, room_id: &str, is_off: bool) -> DispatchReport {
        self.send_message(
            client,
            WebSocketMessage::new(
                MessageType::ToggleCamera,
                json!({ "roomId": room_id, "isOff": is_off }),
            ),
        )
        .await
    }

    pub async fn raise_hand(&self, client: &str, room_id: &str, is_raised: bool) -> DispatchReport {
        self.send_message(
            client,
            WebSocketMessage::new(
                MessageType::RaiseHand,
                json!({ "roomId": room_id, "isRaised": is_raised }),
            ),
        )
        .await
    }

    /// alice creates `room_id`, bob joins it, and both inboxes are cleared
    pub async fn pair_in_room(&self, room_id: &str) {
        self.create_room("alice", room_id, "Alice").await;
        self.join_room("bob", room_id, "Bob").await;
        self.clear_messages().await;
    }
}

//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use interview_relay::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    clients: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    pub fn for_client(setup: &'a TestSetup, client: &'a str) -> Self {
        Self {
            setup,
            clients: vec![client],
        }
    }

    pub fn for_clients(setup: &'a TestSetup, clients: Vec<&'a str>) -> Self {
        Self { setup, clients }
    }

    /// Assert that clients received a specific message type (consumes the message from queue)
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for client in &self.clients {
            let message = self.setup.consume_message_for(client).await;
            assert!(
                message.is_some(),
                "{} should have received {}",
                client,
                expected_type
            );

            let msg: WebSocketMessage = serde_json::from_str(&message.unwrap()).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                client
            );
            messages.push(msg);
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that clients have nothing unread
    pub async fn received_no_messages(self) {
        for client in &self.clients {
            let messages = self.setup.consume_all_for(client).await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                client,
                messages
            );
        }
    }

    /// Count unread messages of one type (consumes everything unread)
    pub async fn count_message_type(self, msg_type: MessageType) -> usize {
        let mut count = 0;
        for client in &self.clients {
            count += self
                .setup
                .consume_all_for(client)
                .await
                .iter()
                .filter_map(|raw| serde_json::from_str::<WebSocketMessage>(raw).ok())
                .filter(|msg| msg.message_type == msg_type)
                .count();
        }
        count
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: serde_json::Value,
}

impl MessageContent {
    pub fn with_field(self, field: &str, expected: impl Into<serde_json::Value>) -> Self {
        assert_eq!(self.payload[field], expected.into(), "field {}", field);
        self
    }

    pub fn with_room(self, room_id: &str) -> Self {
        self.with_field("roomId", room_id)
    }

    pub fn with_role(self, role: &str) -> Self {
        self.with_field("role", role)
    }

    /// Forwarded signals carry the caller's connection id as `sender`
    pub fn with_sender(self, expected_sender: &str) -> Self {
        self.with_field("sender", expected_sender)
    }

    /// Control broadcasts carry the caller's connection id as `senderId`
    pub fn with_sender_id(self, expected_sender: &str) -> Self {
        self.with_field("senderId", expected_sender)
    }

    /// Names of `participants`, in seat order
    pub fn with_participants(self, expected: Vec<&str>) -> Self {
        let names: Vec<&str> = self.payload["participants"]
            .as_array()
            .expect("participants should be an array")
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(names, expected);
        self
    }
}

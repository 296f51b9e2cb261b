use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use interview_relay::{
    event::{EventDispatcher, GatewayEvent, GatewayHandle},
    room::repository::InMemoryRoomRepository,
    websockets::{ConnectionManager, InMemoryConnectionManager},
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A running dispatcher with real registry and connection manager, plus one
/// outbound receiver per simulated client. Connection ids are the client names.
pub struct TestSetup {
    pub gateway: GatewayHandle,
    pub repository: Arc<InMemoryRoomRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub clients: Mutex<HashMap<String, mpsc::UnboundedReceiver<String>>>,
    pub _dispatcher_handle: JoinHandle<()>,
}

pub struct TestSetupBuilder {
    clients: Vec<String>,
    report_undelivered: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            clients: vec![],
            report_undelivered: true,
        }
    }

    pub fn with_clients(mut self, clients: Vec<&str>) -> Self {
        self.clients = clients.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_clients(self) -> Self {
        self.with_clients(vec!["alice", "bob"])
    }

    pub fn with_three_clients(self) -> Self {
        self.with_clients(vec!["alice", "bob", "carol"])
    }

    pub fn without_undelivered_reports(mut self) -> Self {
        self.report_undelivered = false;
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let connection_manager: Arc<dyn ConnectionManager> =
            Arc::new(InMemoryConnectionManager::new());

        let dispatcher = EventDispatcher::new(
            repository.clone(),
            connection_manager.clone(),
            self.report_undelivered,
        );
        let (gateway, handle) = dispatcher.spawn();

        let setup = TestSetup {
            gateway,
            repository,
            connection_manager,
            clients: Mutex::new(HashMap::new()),
            _dispatcher_handle: handle,
        };

        for client in &self.clients {
            setup.connect(client).await;
        }
        // Drop the `connected` greetings so tests start from a clean slate
        setup.clear_messages().await;

        setup
    }
}

impl TestSetup {
    /// Register a client connection and wait until the dispatcher has handled it
    pub async fn connect(&self, client: &str) {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.clients
            .lock()
            .await
            .insert(client.to_string(), receiver);

        self.gateway
            .submit(GatewayEvent::Connected {
                connection_id: client.to_string(),
                sender,
            })
            .await
            .expect("dispatcher should be running");
    }

    /// Pop the oldest unread message for a client
    pub async fn consume_message_for(&self, client: &str) -> Option<String> {
        let mut clients = self.clients.lock().await;
        clients
            .get_mut(client)
            .and_then(|receiver| receiver.try_recv().ok())
    }

    /// Pop every unread message for a client
    pub async fn consume_all_for(&self, client: &str) -> Vec<String> {
        let mut messages = vec![];
        while let Some(message) = self.consume_message_for(client).await {
            messages.push(message);
        }
        messages
    }

    pub async fn clear_messages(&self) {
        let mut clients = self.clients.lock().await;
        for receiver in clients.values_mut() {
            while receiver.try_recv().is_ok() {}
        }
    }
}

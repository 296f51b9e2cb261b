use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Outcome of pushing one message onto a connection's outbound channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    /// Target not connected (or its channel already closed)
    NotDelivered,
}

#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    /// Returns whether the connection was registered
    async fn remove_connection(&self, connection_id: &str) -> bool;

    async fn is_connected(&self, connection_id: &str) -> bool;

    async fn connection_count(&self) -> usize;

    /// Queues a message for the connection without waiting for the socket write
    async fn send_to_connection(&self, connection_id: &str, message: &str) -> DeliveryStatus;
}

pub struct InMemoryConnectionManager {
    // connection_id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) -> bool {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id).is_some()
    }

    async fn is_connected(&self, connection_id: &str) -> bool {
        self.connections.read().await.contains_key(connection_id)
    }

    async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) -> DeliveryStatus {
        let connections = self.connections.read().await;
        match connections.get(connection_id) {
            Some(sender) if sender.send(message.to_string()).is_ok() => DeliveryStatus::Delivered,
            Some(_) => {
                debug!(connection_id = %connection_id, "Outbound channel closed");
                DeliveryStatus::NotDelivered
            }
            None => DeliveryStatus::NotDelivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_registered_connection() {
        let manager = InMemoryConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.add_connection("conn-a".to_string(), tx).await;

        let status = manager.send_to_connection("conn-a", "hello").await;
        assert_eq!(status, DeliveryStatus::Delivered);
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection() {
        let manager = InMemoryConnectionManager::new();
        let status = manager.send_to_connection("ghost", "hello").await;
        assert_eq!(status, DeliveryStatus::NotDelivered);
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let manager = InMemoryConnectionManager::new();
        let (tx, rx) = mpsc::unbounded_channel();
        manager.add_connection("conn-a".to_string(), tx).await;
        drop(rx);

        let status = manager.send_to_connection("conn-a", "hello").await;
        assert_eq!(status, DeliveryStatus::NotDelivered);
    }

    #[tokio::test]
    async fn test_remove_connection() {
        let manager = InMemoryConnectionManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        manager.add_connection("conn-a".to_string(), tx).await;
        assert_eq!(manager.connection_count().await, 1);

        assert!(manager.remove_connection("conn-a").await);
        assert!(!manager.remove_connection("conn-a").await);
        assert!(!manager.is_connected("conn-a").await);
    }
}

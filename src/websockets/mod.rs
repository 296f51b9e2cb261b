// Public API
pub use broadcast::{Delivery, MessageBroadcaster};
pub use connection_manager::{ConnectionManager, DeliveryStatus, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{ClientEvent, MessageType, ProtocolError, WebSocketMessage};
pub use socket::{CloseReason, Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod broadcast;
mod connection_manager;
mod handler;
pub mod messages;
mod socket;

pub use coordinator::PresenceCoordinator;

mod coordinator;

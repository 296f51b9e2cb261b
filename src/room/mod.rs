// Public API - what other modules can use
pub use handlers::{health, suggest_room_code};
pub use types::{HealthResponse, RoomCodeResponse};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;

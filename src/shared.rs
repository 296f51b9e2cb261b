use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::event::GatewayHandle;
use crate::room::repository::RoomRepository;
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub room_repository: Arc<dyn RoomRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    /// Entry point into the single event-processing queue
    pub gateway: GatewayHandle,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
        gateway: GatewayHandle,
    ) -> Self {
        Self {
            config,
            room_repository,
            connection_manager,
            gateway,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

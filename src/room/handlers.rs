use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::RoomService,
    types::{HealthResponse, RoomCodeResponse},
};
use crate::shared::{AppError, AppState};

/// Liveness plus registry counters
///
/// GET /health
#[instrument(name = "health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = RoomService::new(Arc::clone(&state.room_repository));

    Json(HealthResponse {
        status: "ok".to_string(),
        rooms: service.room_count().await,
        connections: state.connection_manager.connection_count().await,
    })
}

/// GET /room-code
/// Returns a code that is free at the time of the call
#[instrument(name = "suggest_room_code", skip(state))]
pub async fn suggest_room_code(
    State(state): State<AppState>,
) -> Result<Json<RoomCodeResponse>, AppError> {
    let service = RoomService::new(Arc::clone(&state.room_repository));
    let room_id = service.suggest_room_code().await?;

    info!(room_id = %room_id, "Suggested room code");

    Ok(Json(RoomCodeResponse { room_id }))
}

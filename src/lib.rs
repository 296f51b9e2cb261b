// Library crate for the interview signaling relay
// This file exposes the public API for integration tests and the binary

pub mod config;
pub mod event;
pub mod presence;
pub mod room;
pub mod shared;
pub mod signaling;
pub mod websockets;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

// Re-export commonly used types for easier access in tests
pub use config::{ConfigError, ServerConfig};
pub use event::{DispatchReport, EventDispatcher, GatewayEvent, GatewayHandle};
pub use room::{models::RoomModel, repository::RoomRepository};
pub use shared::{AppError, AppState};
pub use websockets::{ConnectionManager, MessageType, WebSocketMessage};

/// Routes for the websocket gateway and the HTTP helpers
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/ws", get(websockets::websocket_handler))
        .route("/health", get(room::health))
        .route("/room-code", get(room::suggest_room_code))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST];

    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::test_app_state;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_router_serves_health_with_cors() {
        let app = build_router(test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            HeaderValue::from_static("*")
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = build_router(test_app_state());

        let response = app
            .oneshot(Request::builder().uri("/rooms").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}

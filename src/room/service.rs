use std::sync::Arc;
use tracing::{debug, warn};

use super::{models::generate_room_code, repository::RoomRepository};
use crate::shared::AppError;

/// Collisions tolerated before giving up on a fresh code
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// Read-only helpers over the room registry for the HTTP surface
pub struct RoomService {
    repository: Arc<dyn RoomRepository>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// A code that is not live right now. Nothing is reserved.
    pub async fn suggest_room_code(&self) -> Result<String, AppError> {
        self.suggest_room_code_with(generate_room_code).await
    }

    pub async fn suggest_room_code_with<F>(&self, mut generate: F) -> Result<String, AppError>
    where
        F: FnMut() -> String,
    {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate();
            if self.repository.get_room(&code).await.is_none() {
                return Ok(code);
            }
            debug!(room_id = %code, attempt, "Generated room code is live, retrying");
        }

        warn!(attempts = MAX_CODE_ATTEMPTS, "Could not find a free room code");
        Err(AppError::Internal)
    }

    pub async fn room_count(&self) -> usize {
        self.repository.room_count().await
    }
}

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::db::repository::CollectionRepository;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

/// Ping the store and report whether the service can do useful work.
pub async fn process_health(repo: &dyn CollectionRepository) -> (StatusCode, HealthStatus) {
    match repo.ping().await {
        Ok(()) => (
            StatusCode::OK,
            HealthStatus {
                status: "healthy".to_string(),
                database: "connected".to_string(),
            },
        ),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthStatus {
                    status: "unhealthy".to_string(),
                    database: "unreachable".to_string(),
                },
            )
        }
    }
}

/// Axum handler for `GET /api/health`.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, axum::Json<HealthStatus>) {
    let (status, body) = process_health(state.collection_repo.as_ref()).await;
    (status, axum::Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::MockCollectionRepository;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_healthy_when_ping_succeeds() {
        let mut repo = MockCollectionRepository::new();
        repo.expect_ping().returning(|| Ok(()));

        let (status, body) = process_health(&repo).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
    }

    #[tokio::test]
    async fn test_unhealthy_when_store_unreachable() {
        let mut repo = MockCollectionRepository::new();
        repo.expect_ping()
            .returning(|| Err(AppError::StoreUnavailable("no servers available".into())));

        let (status, body) = process_health(&repo).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.database, "unreachable");
    }
}

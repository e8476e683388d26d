//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode};
use tandem_api::responses::{ComponentStatus, HealthResponse, HealthStatus};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database_status) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, ComponentStatus::Ok),
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, ComponentStatus::Error)
        }
    };

    let health = if database_status == ComponentStatus::Ok {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    (
        status,
        Json(HealthResponse {
            status: health,
            version: tandem_api::API_VERSION.to_string(),
            database_status,
        }),
    )
}

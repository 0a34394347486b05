use crate::api::models::{ComponentStatus, HealthResponse, HealthStatus};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use super::AppState;

/// Handler for GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.admin_repo.count().await {
        Ok(_) => ComponentStatus::Healthy,
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the database");
            ComponentStatus::Unhealthy
        }
    };

    let (status_code, status) = if database == ComponentStatus::Healthy {
        (StatusCode::OK, HealthStatus::Healthy)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unhealthy)
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
        timestamp: Utc::now().to_rfc3339(),
    };

    (status_code, Json(body))
}

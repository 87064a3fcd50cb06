//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(TIMEOUT, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub cache: String,
}

/// Liveness probe - process is running.
#[utoipa::path(get, path = "/live", tag = "health", responses((status = 200, description = "Process is alive")))]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Database and cache check. The database is required; a cache problem only degrades.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Healthy or degraded", body = HealthCheckResponse),
        (status = 503, description = "Database unavailable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = run_check(state.analyses.ping(), "unhealthy").await;
    if database != "healthy" {
        tracing::error!(database = %database, "Database health check failed");
    }

    let cache = run_check(state.cache.ping(), "degraded").await;
    if cache != "healthy" {
        tracing::warn!(cache = %cache, backend = state.cache.backend_name(), "Cache health check failed");
    }

    let (status_code, status) = if database != "healthy" {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else if cache != "healthy" {
        (StatusCode::OK, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: status.to_string(),
            database,
            cache,
        }),
    )
}

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`
    pub status: &'static str,
    /// `connected` or `disconnected`
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match sysacad_db::ping(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

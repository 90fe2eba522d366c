use service_core::{
    axum::{extract::State, response::IntoResponse, Json},
    error::AppError,
    observability::render_metrics,
};

use crate::{dtos::ErrorResponse, AppState};

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Store unreachable", body = ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.users.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Store health check failed");
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
    })))
}

/// Prometheus metrics in text exposition format
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Metrics", body = String)),
    tag = "Observability"
)]
pub async fn metrics() -> impl IntoResponse {
    render_metrics()
}

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::app::AppState;
use crate::error::AppResult;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    info!("Health check requested");

    let database = state.store.is_healthy().await;

    let availability = state.extractors.availability().await;

    let extractor_status: Map<String, Value> = availability
        .iter()
        .map(|(ext, available)| (ext.to_string(), Value::Bool(*available)))
        .collect();

    let status = if database && availability.iter().all(|(_, ok)| *ok) {
        "healthy"
    } else {
        "degraded"
    };

    let response = json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": database,
            "extractors": extractor_status,
        }
    });

    info!(status = status, database_available = database, "Health check completed");

    Ok(Json(response))
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    if state.store.is_healthy().await {
        info!("Readiness check passed");
        Ok(StatusCode::OK)
    } else {
        info!("Readiness check failed - question store unavailable");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

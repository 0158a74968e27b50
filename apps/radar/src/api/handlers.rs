//! # API Endpoint Handlers

use super::{
    AppState,
    types::{EvaluateRequest, EvaluateResponse, HealthResponse, error_kind},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use radar_core::{RadarError, snapshot_digest};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CONFIG HANDLER
// =============================================================================

/// The engine configuration the server evaluates with.
pub async fn config_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(*state.engine.config()))
}

// =============================================================================
// EVALUATE HANDLER
// =============================================================================

/// Evaluate a radar.
///
/// The engine is CPU-bound and runs on its own thread pool, so the call is
/// moved off the async runtime with `spawn_blocking`.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let snapshot = engine.evaluate(&request.technologies, request.org)?;
        let digest = snapshot_digest(&snapshot)?;
        Ok::<_, RadarError>(EvaluateResponse::success(snapshot, digest))
    })
    .await;

    match joined {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)),
        Ok(Err(e)) => {
            let status = status_for(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR || status == StatusCode::CONFLICT {
                tracing::error!(kind = error_kind(&e), "Evaluation failed: {}", e);
            } else {
                tracing::warn!(kind = error_kind(&e), "Rejected evaluation: {}", e);
            }
            (status, Json(EvaluateResponse::error(e.to_string())))
        }
        Err(e) => {
            tracing::error!("Evaluation task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EvaluateResponse::error("Evaluation task failed")),
            )
        }
    }
}

/// HTTP status for an engine error.
pub fn status_for(err: &RadarError) -> StatusCode {
    match err {
        RadarError::InvalidInput(_)
        | RadarError::InvalidConfig(_)
        | RadarError::MalformedMetric { .. } => StatusCode::BAD_REQUEST,
        RadarError::InvariantViolation { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

use crate::types::*;
use crate::{ApiError, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, info};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(SuccessResponse::new(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// Analyze one wallet and return the full report
pub async fn analyze_wallet(
    State(state): State<AppState>,
    request: Option<Json<AnalyzeRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let address = request
        .and_then(|Json(body)| body.address)
        .unwrap_or_default();
    info!("Analysis requested for {:?}", address);

    let report = state.analyzer.analyze(&address).await?;
    debug!(
        "Analysis {} complete: {} swaps",
        report.analysis_id, report.swaps_analyzed
    );

    Ok(Json(SuccessResponse::new(report)))
}

/// `GET /api/analyze` is not supported; tell the caller how to use it
pub async fn analyze_usage() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(UsageHint {
            success: false,
            error: "Method not allowed".to_string(),
            usage: "POST /api/analyze with JSON body { \"address\": \"<wallet>\" }".to_string(),
        }),
    )
}

/// Active configuration with credentials masked
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(SuccessResponse::new(state.config.to_redacted_json()))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use config_manager::SystemConfig;
use job_orchestrator::{OrchestratorError, WalletAnalyzer};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

mod handlers;
mod types;

use handlers::*;
use types::*;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SystemConfig>,
    pub analyzer: WalletAnalyzer,
    pub started_at: Instant,
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Timeout(String),
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Validation(msg) => ApiError::Validation(msg),
            OrchestratorError::Configuration(msg) => ApiError::Config(msg),
            e @ OrchestratorError::Provider(_) => ApiError::Provider(e.to_string()),
            e @ OrchestratorError::Timeout(_) => ApiError::Timeout(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        match status {
            StatusCode::BAD_REQUEST => warn!("Rejected request: {}", self),
            _ => error!("Request failed ({}): {}", status, self),
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,api_server=debug".into()),
        )
        .init();

    info!("Starting Wallet Roaster API Server...");

    // Load configuration
    let config = SystemConfig::load()?;
    info!("Configuration loaded successfully");

    // Fails fast when the Helius key is missing
    let analyzer = WalletAnalyzer::from_config(&config)?;
    info!("Wallet analyzer initialized");

    let app_state = AppState {
        config: Arc::new(config.clone()),
        analyzer,
        started_at: Instant::now(),
    };

    let app = create_router(app_state);

    info!("📋 Available endpoints:");
    info!("   • POST /api/analyze - Analyze a wallet");
    info!("   • GET /api/config - Active configuration (redacted)");
    info!("   • GET /health - Health check");

    // Bind and serve
    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", get(analyze_usage).post(analyze_wallet))
        .route("/api/config", get(get_config))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use pnl_core::{
        PersonalityGenerator, PnLEngine, PnLError, PriceFetcher, SwapEvent, SwapHistorySource,
        TokenRegistry,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::time::Duration;
    use tower::ServiceExt;

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    enum Behaviour {
        Swaps(Vec<SwapEvent>),
        Fail,
        Hang,
    }

    struct FakeHistory(Behaviour);

    #[async_trait]
    impl SwapHistorySource for FakeHistory {
        async fn fetch_swaps(&self, _address: &str) -> pnl_core::Result<Vec<SwapEvent>> {
            match &self.0 {
                Behaviour::Swaps(swaps) => Ok(swaps.clone()),
                Behaviour::Fail => Err(PnLError::Provider("API error: 503".to_string())),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    struct FlatPrices;

    #[async_trait]
    impl PriceFetcher for FlatPrices {
        async fn fetch_prices(&self, token_mints: &[String]) -> HashMap<String, Decimal> {
            token_mints.iter().map(|m| (m.clone(), dec!(1))).collect()
        }
    }

    fn app(behaviour: Behaviour, timeout: Duration) -> Router {
        let analyzer = WalletAnalyzer::new(
            Arc::new(FakeHistory(behaviour)),
            Arc::new(FlatPrices),
            PnLEngine::new(TokenRegistry::default(), PersonalityGenerator::default()),
            timeout,
        );
        create_router(AppState {
            config: Arc::new(SystemConfig::default()),
            analyzer,
            started_at: Instant::now(),
        })
    }

    fn analyze_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Behaviour::Swaps(Vec::new()), Duration::from_secs(5))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_analyze_empty_wallet_returns_ghost() {
        let body = format!(r#"{{"address":"{}"}}"#, WALLET);
        let response = app(Behaviour::Swaps(Vec::new()), Duration::from_secs(5))
            .oneshot(analyze_request(&body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["address"], WALLET);
        assert_eq!(body["data"]["personality"]["mainTitle"], "Ghost Wallet");
        assert_eq!(body["data"]["personality"]["degenScore"], 0);
    }

    #[tokio::test]
    async fn test_missing_address_is_bad_request() {
        for body in ["{}", r#"{"address":"  "}"#, ""] {
            let response = app(Behaviour::Swaps(Vec::new()), Duration::from_secs(5))
                .oneshot(analyze_request(body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = json_body(response).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], "Wallet address is required");
        }
    }

    #[tokio::test]
    async fn test_malformed_address_is_bad_request() {
        let response = app(Behaviour::Swaps(Vec::new()), Duration::from_secs(5))
            .oneshot(analyze_request(r#"{"address":"0xdeadbeef"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid Solana wallet address");
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let body = format!(r#"{{"address":"{}"}}"#, WALLET);
        let response = app(Behaviour::Fail, Duration::from_secs(5))
            .oneshot(analyze_request(&body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_gateway_timeout() {
        let body = format!(r#"{{"address":"{}"}}"#, WALLET);
        let response = app(Behaviour::Hang, Duration::from_secs(1))
            .oneshot(analyze_request(&body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_get_analyze_is_method_not_allowed() {
        let response = app(Behaviour::Swaps(Vec::new()), Duration::from_secs(5))
            .oneshot(Request::get("/api/analyze").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let json = json_body(response).await;
        assert!(json["usage"].as_str().unwrap().contains("POST /api/analyze"));
    }

    #[tokio::test]
    async fn test_config_is_redacted() {
        let response = app(Behaviour::Swaps(Vec::new()), Duration::from_secs(5))
            .oneshot(Request::get("/api/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["api"]["port"], 3000);
    }
}

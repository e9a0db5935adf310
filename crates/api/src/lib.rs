//! Accident Severity API Server
//!
//! HTTP shell around the severity pipeline: `/health`, `/predict` and
//! `/metrics`, with API-key auth, trusted-host checks, CORS and per-IP
//! rate limiting.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use data_validator::Validator;
use inference_engine::{FittedArtifacts, Predictor};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn};
use uuid::Uuid;

mod error;
pub mod logging;
mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod settings;
pub mod telemetry;

pub use error::{ApiError, ApiResult};
pub use logging::init_logging;
pub use middleware::is_trusted_host;
pub use settings::{Settings, SettingsError};

/// Whether the fitted artifacts are usable
pub enum ArtifactState {
    Ready(Predictor),
    Unavailable(String),
}

impl ArtifactState {
    /// Load artifacts, keeping the failure reason instead of erroring
    pub fn load(settings: &Settings) -> Self {
        match FittedArtifacts::load(&settings.artifacts) {
            Ok(artifacts) => ArtifactState::Ready(Predictor::new(artifacts)),
            Err(e) => ArtifactState::Unavailable(e.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ArtifactState::Ready(_))
    }

    pub fn predictor(&self) -> ApiResult<&Predictor> {
        match self {
            ArtifactState::Ready(predictor) => Ok(predictor),
            ArtifactState::Unavailable(reason) => Err(ApiError::NotReady(reason.clone())),
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub settings: Settings,
    pub artifacts: ArtifactState,
    pub validator: Validator,
    /// Absent when no global recorder was installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, artifacts: ArtifactState, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            validator: Validator::new(settings.validation.clone()),
            settings,
            artifacts,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.settings.security;
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|o| o.trim() != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let mut headers = vec![axum::http::header::CONTENT_TYPE];
    if let Ok(name) = HeaderName::from_bytes(security.api_key_header.as_bytes()) {
        headers.push(name);
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(headers)
        .allow_credentials(true)
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/health", get(routes::health::check));

    let protected_routes = Router::new()
        .route("/predict", post(routes::predict::predict))
        .route("/metrics", get(routes::metrics::render))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    let mut router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_trusted_host,
        ))
        .layer(cors_layer(&state));

    if state.settings.rate_limit.enabled {
        match rate_limit::create_governor_config(&state.settings.rate_limit) {
            Some(config) => router = router.layer(GovernorLayer { config }),
            None => warn!("Rate limit quota is invalid, rate limiting disabled"),
        }
    }

    router
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %req.method(),
                path = %req.uri().path(),
            )
        }))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn run_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.settings.server.bind_addr();
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

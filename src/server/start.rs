use anyhow::{Result, anyhow};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use axum::routing::{get, post};
use metrics::counter;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::cli::Environment;
use crate::extract::Extractor;
use crate::logs::init_logging_and_metrics;
use crate::server::http;
use crate::server::limit::create_rate_limit_layer;
use crate::server::state::AppState;
use crate::utils::{BYTES_PER_MB, format_duration, generate_request_id};

/// Allowance on top of the file size limit for multipart framing
const MULTIPART_OVERHEAD_BYTES: u64 = BYTES_PER_MB;

/// Configuration for server startup
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub env: Environment,
    pub log_level: String,
    pub max_file_size_mb: u64,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub max_concurrent_extractions: usize,
    pub extract_timeout_secs: u64,
}

/// Start the extraction API server based on the provided configuration
pub async fn start_server(config: ServerConfig) -> Result<()> {
    // Initialize structured logging and metrics
    init_logging_and_metrics(config.env, &config.log_level);
    // Output debugging information
    info!(
        bind_address = %config.bind_address,
        environment = ?config.env,
        max_file_size_mb = config.max_file_size_mb,
        rate_limit_rps = config.rate_limit_rps,
        rate_limit_burst = config.rate_limit_burst,
        max_concurrent_extractions = config.max_concurrent_extractions,
        extract_timeout_secs = config.extract_timeout_secs,
        "Server configuration loaded"
    );
    // Create the shared handler state
    let state = AppState::from_config(&config, Extractor::new());
    // Create the router with all middleware layers
    let router = build_router(&config, state)?;
    // Create a TCP listener for the HTTP server
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to address {}: {e}", config.bind_address))?;
    // Output debugging information
    info!(
        bind_address = %config.bind_address,
        "Starting extraction API server in HTTP mode"
    );
    let started_at = Instant::now();
    // Serve the Axum router over HTTP
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    // Output debugging information
    info!(
        uptime = %format_duration(started_at.elapsed()),
        "Server stopped"
    );
    // All ok
    Ok(())
}

/// Resolve when Ctrl+C is received
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

/// Build the HTTP router with CORS, tracing, rate limiting and body limits
pub fn build_router(config: &ServerConfig, state: AppState) -> Result<Router> {
    // Allow the multipart envelope around the largest accepted file
    let body_limit = usize::try_from(
        state
            .max_file_size_bytes()
            .saturating_add(MULTIPART_OVERHEAD_BYTES),
    )
    .unwrap_or(usize::MAX);
    // Create CORS layer allowing any browser origin
    let cors_layer = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(false);
    // Create rate limiting layer with metrics
    let rate_limit_layer =
        create_rate_limit_layer(config.rate_limit_rps, config.rate_limit_burst)?;
    // Create tracing layer for request logging
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = generate_request_id();
            tracing::info_span!(
                "http_request",
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            counter!("pdfplayground.total_requests").increment(1);
            debug!(
                method = %request.method(),
                uri = %request.uri(),
                "HTTP request started"
            );
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    warn!(
                        status = %status,
                        latency_ms = latency.as_millis(),
                        "HTTP request failed"
                    );
                } else {
                    info!(
                        status = %status,
                        latency_ms = latency.as_millis(),
                        "HTTP request completed"
                    );
                }
            },
        );
    // Create an Axum router with the API routes
    let router = Router::new()
        .route("/", get(http::root))
        .route("/health", get(http::health))
        .route("/models", get(http::models))
        .route("/upload", post(http::upload))
        .route("/extract", post(http::extract))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(trace_layer)
        .layer(rate_limit_layer)
        .layer(cors_layer);
    Ok(router)
}

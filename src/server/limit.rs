use anyhow::{Result, anyhow};
use axum::Json;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use governor::middleware::NoOpMiddleware;
use metrics::counter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, errors::GovernorError, governor::GovernorConfigBuilder,
    key_extractor::KeyExtractor,
};
use tracing::{debug, warn};

use crate::server::error::ErrorBody;

/// Proxy headers consulted for the client address, in order of preference
const CLIENT_IP_HEADERS: [&str; 8] = [
    "X-Forwarded-For",
    "X-Real-IP",        // Nginx
    "X-Client-IP",      // Proxies
    "CF-Connecting-IP", // Cloudflare
    "True-Client-IP",   // Akamai
    "X-Originating-IP",
    "X-Remote-IP",
    "X-Remote-Addr",
];

/// Key extractor that tries to get the client IP from proxy headers and falls back to the socket
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = String;

    fn extract<B>(&self, req: &Request<B>) -> Result<Self::Key, GovernorError> {
        // Try to extract IP from various headers in order of preference
        let ip = CLIENT_IP_HEADERS.iter().find_map(|name| {
            req.headers()
                .get(*name)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
        });
        // If we find an identifying key, use it
        if let Some(ip) = ip {
            debug!(ip = ip, "Extracted IP address from headers");
            return Ok(ip.to_string());
        }
        // Otherwise, try to retrieve the connection info
        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            debug!(ip = ?addr.ip(), "Extracted IP address from socket");
            return Ok(addr.ip().to_string());
        }
        // If we don't find an identifying key, use a default key
        warn!("Could not extract IP address from request, using default key");
        Ok("unknown".to_string())
    }
}

/// Create a rate limiting layer with metrics and logging
pub fn create_rate_limit_layer(
    rps: u32,
    burst: u32,
) -> Result<GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware, Body>> {
    // Output debugging information
    debug!(rps, burst, "Configuring the HTTP rate limiter");
    // One quota element is replenished every 1/rps seconds
    if rps == 0 {
        return Err(anyhow!("Rate limit must allow at least one request per second"));
    }
    let replenish_ms = (1000 / rps).max(1) as u64;
    // Create the rate limit configuration
    let config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(burst)
        .key_extractor(ClientIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("Invalid rate limit configuration: rps={rps}, burst={burst}"))?;
    // Return the rate limit layer
    Ok(GovernorLayer::new(Arc::new(config)).error_handler(|e| {
        // Output debugging information
        warn!("Rate limit exceeded: {e}");
        // Increment rate limit error metrics
        counter!("pdfplayground.total_errors").increment(1);
        counter!("pdfplayground.total_rate_limit_errors").increment(1);
        // Return the error response
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody {
                detail: "Rate limit exceeded".to_string(),
            }),
        )
            .into_response()
    }))
}

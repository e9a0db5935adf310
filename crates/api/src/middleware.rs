//! Request guards: API key and trusted host

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};

use crate::{ApiError, AppState};

/// Middleware: require the configured API key header, if one is set
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let security = &state.settings.security;
    if let Some(expected) = security.api_key.as_deref() {
        let provided = req
            .headers()
            .get(security.api_key_header.as_str())
            .and_then(|v| v.to_str().ok());
        if !provided.is_some_and(|p| constant_time_eq(p.as_bytes(), expected.as_bytes())) {
            tracing::warn!(path = %req.uri().path(), "Rejected request with missing or invalid API key");
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(req).await)
}

/// Middleware: reject requests whose `Host` is not in the allow list
pub async fn require_trusted_host(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let allowed = &state.settings.security.allowed_hosts;
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(strip_port);

    let ok = match host {
        Some(host) => is_trusted_host(host, allowed),
        None => allowed.iter().any(|p| p == "*"),
    };
    if !ok {
        tracing::warn!(host = ?host, "Rejected request for untrusted host");
        return Err(ApiError::InvalidHost);
    }
    Ok(next.run(req).await)
}

/// `example.com:8000` -> `example.com`, `[::1]:80` -> `[::1]`
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

/// Match a host against patterns; `*.x` matches any subdomain of `x`
pub fn is_trusted_host(host: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if pattern == "*" {
            true
        } else if let Some(suffix) = pattern.strip_prefix("*.") {
            host.len() > suffix.len() + 1
                && host.is_char_boundary(host.len() - suffix.len())
                && host[host.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
                && host.as_bytes()[host.len() - suffix.len() - 1] == b'.'
        } else {
            host.eq_ignore_ascii_case(pattern)
        }
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

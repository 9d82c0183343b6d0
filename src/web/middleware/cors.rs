//! CORS middleware configuration.

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Origins allowed when none are configured (local frontend dev servers).
pub const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
];

/// Resolve the origin whitelist: the configured list (or the dev defaults
/// when empty) plus the frontend URL.
pub fn allowed_origins(configured: &[String], frontend_url: &str) -> Vec<String> {
    let mut origins: Vec<String> = if configured.is_empty() {
        DEV_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        configured.to_vec()
    };

    let frontend = frontend_url.trim_end_matches('/');
    if !frontend.is_empty() && !origins.iter().any(|o| o == frontend) {
        origins.push(frontend.to_string());
    }
    origins
}

/// Create a credentialed CORS layer for an explicit origin whitelist.
///
/// Unparseable origins are skipped with a warning.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .allow_credentials(true)
        .allow_origin(parsed)
}

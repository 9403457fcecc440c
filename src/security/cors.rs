//! CORS policy.
//!
//! The access policy only switches CORS on; which origins, methods and
//! headers are allowed lives in `CorsConfig`.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

/// Build the CORS layer, or `None` when CORS is disabled.
///
/// Entries that do not parse are skipped with a warning; validation has
/// already rejected bad methods.
pub fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let origins: Vec<HeaderValue> = parse_all(&config.allowed_origins, "origin");
    let methods: Vec<Method> = parse_all(&config.allowed_methods, "method");
    let headers: Vec<HeaderName> = parse_all(&config.allowed_headers, "header");

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .max_age(Duration::from_secs(config.max_age_secs)),
    )
}

fn parse_all<T: std::str::FromStr>(items: &[String], what: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match item.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(value = %item, kind = what, "Ignoring unparsable CORS entry");
                None
            }
        })
        .collect()
}

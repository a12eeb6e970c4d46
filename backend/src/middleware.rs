//! Server-wide middleware configuration helpers.
//!
//! Applied in order:
//! 1. **CORS**: cross-origin policy (via actix-cors)
//! 2. **Logger**: request/response logging

use actix_cors::Cors;
use actix_web::http::{header::HeaderName, Method};
use actix_web::middleware;
use log::debug;
use postgremote_configs::CorsSettings;

/// Build CORS middleware from the `[security.cors]` settings.
///
/// The credential travels in a cookie, so browsers on another origin only
/// send it when `allow_credentials` is on. A wildcard origin cannot be
/// combined with credentials, so in that case the request origin is echoed.
/// Any origin must be requested explicitly with `"*"`; an empty list allows
/// no cross-origin requests.
pub fn build_cors_from_config(cors_config: &CorsSettings) -> Cors {
    let mut cors = Cors::default();

    if cors_config.allowed_origins.is_empty() {
        debug!("CORS: No cross-origin requests allowed");
    } else if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = if cors_config.allow_credentials {
            cors.allowed_origin_fn(|_, _| true)
        } else {
            cors.allow_any_origin()
        };
        debug!("CORS: Allowing any origin");
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        debug!("CORS: Allowed origins: {:?}", cors_config.allowed_origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    if cors_config.allowed_headers.iter().any(|h| h == "*") {
        cors = cors.allow_any_header();
    } else {
        let headers: Vec<HeaderName> = cors_config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if !headers.is_empty() {
            cors = cors.allowed_headers(headers);
        }
    }

    if cors_config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors.max_age(cors_config.max_age as usize)
}

/// Build the request logger middleware.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::default()
}

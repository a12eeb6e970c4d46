//! API routes configuration

use crate::handlers;
use actix_web::web;

/// Configure gateway routes
///
/// - POST / - statement endpoint at the root
/// - POST /v1/api/jsql - statement endpoint
/// - POST /v1/api/logout - clear the credential cookie
/// - GET /v1/api/healthcheck - health check
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(handlers::jsql_handler)).service(
        web::scope("/v1").service(
            web::scope("/api")
                .route("/jsql", web::post().to(handlers::jsql_handler))
                .route("/logout", web::post().to(handlers::logout_handler))
                .route("/healthcheck", web::get().to(handlers::healthcheck_handler)),
        ),
    );
}

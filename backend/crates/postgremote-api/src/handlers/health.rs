use crate::models::HealthResponse;
use actix_web::{HttpResponse, Responder};

/// GET /v1/api/healthcheck
///
/// Does not touch the database.
pub async fn healthcheck_handler() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::ok_with_version(env!("CARGO_PKG_VERSION")))
}

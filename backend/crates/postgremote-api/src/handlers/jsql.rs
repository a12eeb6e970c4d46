//! Statement endpoint
//!
//! The body is one JSON statement. Rows come back as a JSON array. A
//! token-producing function answers `true` and the credential goes out only
//! in the `Set-Cookie` header.

use crate::error::GatewayError;
use crate::executor::{ExecutionOutcome, RequestExecutor};
use actix_web::{web, HttpRequest, HttpResponse};
use log::warn;
use postgremote_auth::{create_auth_cookie, extract_credential};
use postgremote_sql::Statement;
use std::sync::Arc;

/// POST /v1/api/jsql (also mounted at POST /)
pub async fn jsql_handler(
    req: HttpRequest,
    body: web::Bytes,
    executor: web::Data<Arc<RequestExecutor>>,
) -> Result<HttpResponse, GatewayError> {
    let statement: Statement =
        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidBody(e.to_string()))?;

    let settings = executor.settings();
    let credential = match extract_credential(&req, &settings.cookie.name) {
        Ok(credential) => credential,
        Err(e) if executor.has_default_role() => {
            warn!("Ignoring unusable credential, using default role: {}", e);
            None
        },
        Err(e) => return Err(e.into()),
    };

    let token = credential.as_ref().map(|c| c.token.as_str());
    match executor.execute(token, statement).await? {
        ExecutionOutcome::Rows(rows) => Ok(HttpResponse::Ok().json(rows)),
        ExecutionOutcome::Token { token, .. } => {
            let cookie = create_auth_cookie(&token, settings.token_expiry_secs, &settings.cookie);
            Ok(HttpResponse::Ok().cookie(cookie).json(true))
        },
    }
}

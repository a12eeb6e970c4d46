//! Gateway errors and their HTTP mapping.
//!
//! Failures from authentication, statement validation, role assumption and
//! execution all answer `403 Forbidden` with the message as plain text. The
//! database's "permission denied" is not told apart from other statement
//! failures.

use crate::pool::PoolError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use postgremote_auth::AuthError;
use postgremote_sql::JsqlError;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Authentication(#[from] AuthError),

    #[error("{0}")]
    Statement(#[from] JsqlError),

    /// The request body is not a statement.
    #[error("Invalid statement body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    RoleAssumption(String),

    #[error("{0}")]
    Execution(String),

    /// The token-producing function returned something unusable.
    #[error("Invalid token payload: {0}")]
    TokenPayload(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Failed to issue credential: {0}")]
    Signing(String),
}

impl GatewayError {
    pub fn is_client_failure(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<PoolError> for GatewayError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Unavailable(msg) => GatewayError::Unavailable(msg),
            PoolError::Role(msg) => GatewayError::RoleAssumption(msg),
            PoolError::Query(msg) => GatewayError::Execution(msg),
            decode @ PoolError::Decode { .. } => GatewayError::Execution(decode.to_string()),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Authentication(AuthError::SigningError(_)) | GatewayError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Authentication(_)
            | GatewayError::Statement(_)
            | GatewayError::RoleAssumption(_)
            | GatewayError::Execution(_)
            | GatewayError::TokenPayload(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            // Signing details stay in the server log.
            GatewayError::Signing(_) | GatewayError::Authentication(AuthError::SigningError(_)) => {
                "Failed to issue credential".to_string()
            },
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let forbidden = [
            GatewayError::Authentication(AuthError::TokenExpired),
            GatewayError::Statement(JsqlError::MissingFrom),
            GatewayError::RoleAssumption("role \"x\" does not exist".into()),
            GatewayError::Execution("permission denied for table t".into()),
            GatewayError::TokenPayload("empty".into()),
        ];
        for err in forbidden {
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN, "{:?}", err);
            assert!(err.is_client_failure());
        }

        assert_eq!(
            GatewayError::Unavailable("pool timed out".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::Signing("bad key".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(GatewayError::InvalidBody("eof".into()).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pool_error_mapping() {
        let err: GatewayError = PoolError::Query("syntax error".into()).into();
        assert!(matches!(err, GatewayError::Execution(ref m) if m == "syntax error"));

        let err: GatewayError = PoolError::Role("role \"x\" does not exist".into()).into();
        assert!(matches!(err, GatewayError::RoleAssumption(_)));

        let err: GatewayError = PoolError::Unavailable("closed".into()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_body_is_plain_text() {
        let resp = GatewayError::Execution("permission denied for table t".into()).error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}

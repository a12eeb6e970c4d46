//! Credential extraction from HTTP requests.
//!
//! The credential is read from the auth cookie first, then from an
//! `Authorization: Bearer <token>` header. No credential at all is not an
//! error here; the role resolver decides what an anonymous request becomes.

use crate::cookie::extract_auth_token;
use crate::error::{AuthError, AuthResult};
use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

/// Where the credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    BearerHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

/// Extract the raw credential from `req`.
///
/// # Errors
/// `MalformedAuthorization` when an `Authorization` header is present but
/// is not a non-empty Bearer token.
pub fn extract_credential(req: &HttpRequest, cookie_name: &str) -> AuthResult<Option<Credential>> {
    if let Ok(cookies) = req.cookies() {
        if let Some(token) = extract_auth_token(cookies.iter().cloned(), cookie_name) {
            return Ok(Some(Credential {
                token,
                source: CredentialSource::Cookie,
            }));
        }
    }

    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| {
        AuthError::MalformedAuthorization("Authorization header is not valid ASCII".to_string())
    })?;

    parse_bearer(value).map(|token| {
        Some(Credential {
            token,
            source: CredentialSource::BearerHeader,
        })
    })
}

fn parse_bearer(value: &str) -> AuthResult<String> {
    let mut parts = value.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedAuthorization(format!(
            "Unsupported authorization scheme '{}'",
            scheme
        )));
    }

    let token = parts.next().map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::MalformedAuthorization("Empty bearer token".to_string()));
    }
    Ok(token.to_string())
}

// JWT signing and validation for role credentials

use crate::error::{AuthError, AuthResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default credential lifetime in seconds (one day).
pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// Default issuer written into minted tokens.
pub const POSTGREMOTE_ISSUER: &str = "postgremote";

/// Claims carried by a gateway credential.
///
/// `sub` is the database role the bearer acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (database role name)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl JwtClaims {
    pub fn new(subject: &str, issuer: &str, expiry_secs: i64) -> Self {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(expiry_secs);

        Self {
            sub: subject.to_string(),
            iss: issuer.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }
}

/// Encode claims as an HS256 token.
///
/// # Errors
/// Returns `AuthError::SigningError` if encoding fails
pub fn generate_jwt_token(claims: &JwtClaims, secret: &str) -> AuthResult<String> {
    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &encoding_key)
        .map_err(|e| AuthError::SigningError(format!("JWT encoding error: {}", e)))
}

/// Build claims for `subject` and sign them in one step.
pub fn create_and_sign_token(
    subject: &str,
    issuer: &str,
    expiry_secs: i64,
    secret: &str,
) -> AuthResult<(String, JwtClaims)> {
    if subject.is_empty() {
        return Err(AuthError::MissingClaim("sub".to_string()));
    }
    let claims = JwtClaims::new(subject, issuer, expiry_secs);
    let token = generate_jwt_token(&claims, secret)?;
    Ok((token, claims))
}

/// Validate a token and return its claims.
///
/// Verifies the signature, expiration, that the issuer is trusted and that
/// `sub` is present.
///
/// # Errors
/// - `AuthError::InvalidSignature` if signature verification fails
/// - `AuthError::TokenExpired` if the token has expired
/// - `AuthError::UntrustedIssuer` if the issuer is not in the trusted list
/// - `AuthError::MissingClaim` if `sub` is empty
/// - `AuthError::MalformedAuthorization` for anything that is not a JWT
pub fn validate_jwt_token(
    token: &str,
    secret: &str,
    trusted_issuers: &[String],
) -> AuthResult<JwtClaims> {
    decode_header(token)
        .map_err(|e| AuthError::MalformedAuthorization(format!("Invalid JWT header: {}", e)))?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_nbf = false;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data =
        decode::<JwtClaims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::MalformedAuthorization(format!("JWT decode error: {}", e)),
        })?;

    let claims = token_data.claims;

    verify_issuer(&claims.iss, trusted_issuers)?;

    if claims.sub.is_empty() {
        return Err(AuthError::MissingClaim("sub".to_string()));
    }

    Ok(claims)
}

/// An empty trusted list rejects every issuer.
fn verify_issuer(issuer: &str, trusted_issuers: &[String]) -> AuthResult<()> {
    if trusted_issuers.is_empty() {
        return Err(AuthError::UntrustedIssuer(format!(
            "No trusted issuers configured. Rejecting issuer: {}",
            issuer
        )));
    }

    if trusted_issuers.iter().any(|i| i == issuer) {
        Ok(())
    } else {
        Err(AuthError::UntrustedIssuer(issuer.to_string()))
    }
}

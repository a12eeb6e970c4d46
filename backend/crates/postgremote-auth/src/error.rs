use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Credential failures. All of them are scoped to one request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authorization: {0}")]
    MissingAuthorization(String),

    #[error("Malformed authorization: {0}")]
    MalformedAuthorization(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Untrusted issuer: {0}")]
    UntrustedIssuer(String),

    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// The credential subject cannot name a database role.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Token signing failed: {0}")]
    SigningError(String),
}

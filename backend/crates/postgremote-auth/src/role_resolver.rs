//! Map a request credential onto a database role.

use crate::error::{AuthError, AuthResult};
use crate::jwt_auth::validate_jwt_token;
use log::{debug, warn};
use postgremote_sql::Role;

/// How the acting role was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    Credential,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRole {
    pub role: Role,
    pub source: RoleSource,
}

#[derive(Debug, Clone)]
pub struct RoleResolver {
    secret: String,
    trusted_issuers: Vec<String>,
    default_role: Option<Role>,
}

impl RoleResolver {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, default_role: Option<Role>) -> Self {
        Self {
            secret: secret.into(),
            trusted_issuers: vec![issuer.into()],
            default_role,
        }
    }

    pub fn default_role(&self) -> Option<&Role> {
        self.default_role.as_ref()
    }

    /// A verified credential yields its subject. Otherwise the default role
    /// is used when one is configured; without one, a missing credential is
    /// `MissingAuthorization` and a bad one keeps its own error.
    pub fn resolve(&self, credential: Option<&str>) -> AuthResult<ResolvedRole> {
        let failure = match credential {
            Some(token) => match self.verify(token) {
                Ok(role) => {
                    debug!("Credential verified for role {:?}", role.name());
                    return Ok(ResolvedRole {
                        role,
                        source: RoleSource::Credential,
                    });
                },
                Err(e) => e,
            },
            None => AuthError::MissingAuthorization("No credential supplied".to_string()),
        };

        match &self.default_role {
            Some(role) => {
                if credential.is_some() {
                    warn!("Rejected credential ({}); using default role", failure);
                }
                Ok(ResolvedRole {
                    role: role.clone(),
                    source: RoleSource::Default,
                })
            },
            None => Err(failure),
        }
    }

    fn verify(&self, token: &str) -> AuthResult<Role> {
        let claims = validate_jwt_token(token, &self.secret, &self.trusted_issuers)?;
        Role::define(claims.sub.as_str()).map_err(|e| AuthError::InvalidRole(e.to_string()))
    }
}

//! Per-request statement execution.
//!
//! One request runs as:
//! 1. resolve the acting role from the credential (or the default role)
//! 2. swap registered function descriptors in, validate and compile
//! 3. borrow a connection and `SET ROLE` on it
//! 4. run the statement
//! 5. for a token-producing function, mint a credential for the returned
//!    subject instead of returning rows
//!
//! The connection is dropped, and so returned to the pool, before the
//! outcome is built.

use crate::error::{GatewayError, GatewayResult};
use crate::pool::{ConnectionPool, PreparedQuery};
use crate::token::subject_from_output;
use log::{debug, info, warn};
use postgremote_auth::{create_and_sign_token, AuthError, CookieConfig, JwtClaims, RoleResolver};
use postgremote_configs::ServerConfig;
use postgremote_sql::{EntityRegistry, Role, Statement, ValueMap};
use std::sync::Arc;

/// What a successful request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Rows(Vec<ValueMap>),
    /// A freshly minted credential. Only ever sent as a cookie.
    Token { token: String, claims: JwtClaims },
}

/// Process-wide settings the executor needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_expiry_secs: i64,
    /// Required database type of the token-bearing column, if any.
    pub token_type: Option<String>,
    pub default_role: Option<Role>,
    pub cookie: CookieConfig,
}

impl ExecutorSettings {
    pub fn from_config(config: &ServerConfig) -> GatewayResult<Self> {
        let default_role = config
            .auth
            .default_role
            .as_deref()
            .map(Role::define)
            .transpose()?;

        let cookie = CookieConfig {
            secure: config.auth.cookie_secure,
            ..CookieConfig::named(config.auth.cookie_name.clone())
        };

        Ok(Self {
            jwt_secret: config.auth.jwt_secret.clone(),
            jwt_issuer: config.auth.jwt_issuer.clone(),
            token_expiry_secs: config.auth.token_expiry_secs,
            token_type: config.gateway.token_type.clone(),
            default_role,
            cookie,
        })
    }
}

pub struct RequestExecutor {
    pool: Arc<dyn ConnectionPool>,
    registry: Arc<EntityRegistry>,
    resolver: RoleResolver,
    settings: ExecutorSettings,
}

impl RequestExecutor {
    pub fn new(
        pool: Arc<dyn ConnectionPool>,
        registry: Arc<EntityRegistry>,
        settings: ExecutorSettings,
    ) -> Self {
        let resolver = RoleResolver::new(
            settings.jwt_secret.clone(),
            settings.jwt_issuer.clone(),
            settings.default_role.clone(),
        );
        Self {
            pool,
            registry,
            resolver,
            settings,
        }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &Arc<dyn ConnectionPool> {
        &self.pool
    }

    pub fn has_default_role(&self) -> bool {
        self.resolver.default_role().is_some()
    }

    /// Run one client statement under the role the credential maps to.
    pub async fn execute(
        &self,
        credential: Option<&str>,
        statement: Statement,
    ) -> GatewayResult<ExecutionOutcome> {
        let result = self.run(credential, statement).await;
        if let Err(e) = &result {
            if e.is_client_failure() {
                warn!("Statement rejected: {}", e);
            } else {
                log::error!("Statement failed: {}", e);
            }
        }
        result
    }

    async fn run(
        &self,
        credential: Option<&str>,
        statement: Statement,
    ) -> GatewayResult<ExecutionOutcome> {
        let resolved = self.resolver.resolve(credential)?;
        debug!("Acting role {:?} ({:?})", resolved.role.name(), resolved.source);

        let statement = self.registry.resolve(statement);
        statement.validate()?;
        let compiled = statement.compile()?;
        debug!("Compiled {}: {}", statement.kind(), compiled.text);

        let query = PreparedQuery::new(compiled.text, compiled.parameters)
            .with_types(statement.parameter_types());

        let output = {
            let mut conn = self.pool.acquire().await?;
            conn.set_role(&resolved.role).await?;
            conn.query(&query).await?
        };

        let Some(function) = statement.token_function() else {
            return Ok(ExecutionOutcome::Rows(output.rows));
        };

        let subject = subject_from_output(&output, self.settings.token_type.as_deref())?;
        let role = Role::define(subject.as_str())
            .map_err(|e| GatewayError::TokenPayload(e.to_string()))?;

        let (token, claims) = create_and_sign_token(
            role.name(),
            &self.settings.jwt_issuer,
            self.settings.token_expiry_secs,
            &self.settings.jwt_secret,
        )
        .map_err(|e| match e {
            AuthError::SigningError(msg) => GatewayError::Signing(msg),
            other => GatewayError::Authentication(other),
        })?;

        info!("Issued credential for role {:?} via {:?}", claims.sub, function.name());
        Ok(ExecutionOutcome::Token { token, claims })
    }
}

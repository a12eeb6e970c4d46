use super::defaults::*;
use postgremote_sql::{Function, Role, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    /// `[[tables]]`
    #[serde(default)]
    pub tables: Vec<Table>,
    /// `[[roles]]`
    #[serde(default)]
    pub roles: Vec<Role>,
    /// `[[functions]]`, including token-producing ones
    #[serde(default)]
    pub functions: Vec<Function>,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Postgres connection pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Role every connection returns to when released.
    /// "NONE" issues `RESET ROLE`; anything else `SET ROLE "<name>"`.
    #[serde(default = "default_neutral_role")]
    pub neutral_role: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            neutral_role: default_neutral_role(),
        }
    }
}

impl DatabaseSettings {
    /// `None` when the neutral role is the login role.
    pub fn neutral_role(&self) -> Option<&str> {
        if self.neutral_role.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(self.neutral_role.as_str())
        }
    }
}

/// Credential settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    /// Lifetime of minted credentials; also the cookie Max-Age.
    #[serde(default = "default_token_expiry_secs")]
    pub token_expiry_secs: i64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Role for requests without a usable credential. Unset = such requests fail.
    #[serde(default)]
    pub default_role: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_jwt_issuer(),
            token_expiry_secs: default_token_expiry_secs(),
            cookie_name: default_cookie_name(),
            cookie_secure: true,
            default_role: None,
        }
    }
}

/// Statement endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Database type name the token-bearing result column must have
    /// (e.g. "jwt_token"). Unset = the column type is not checked.
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            token_type: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for server.log
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides:
    /// [logging.targets]
    /// sqlx = "info"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

/// CORS configuration that maps directly to actix-cors options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins. ["*"] = any origin; empty = same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,
    /// Needed for the credential cookie to cross origins.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
    /// Preflight cache max age in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            allow_credentials: true,
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecuritySettings {
    #[serde(default)]
    pub cors: CorsSettings,
}

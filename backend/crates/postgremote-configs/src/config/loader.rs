use super::types::ServerConfig;
use postgremote_sql::escape_identifier;
use std::fs;
use std::path::Path;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];
/// Upper bound on credential lifetime (one year).
const MAX_TOKEN_EXPIRY_SECS: i64 = 365 * 24 * 60 * 60;

impl ServerConfig {
    /// Load `path`, apply `POSTGREMOTE_*` environment overrides, validate.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.finalize()?;
        Ok(config)
    }

    /// Parse a TOML file. Nothing is validated yet.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - POSTGREMOTE_SERVER_HOST: Override server.host
    /// - POSTGREMOTE_SERVER_PORT: Override server.port
    /// - POSTGREMOTE_DATABASE_URL: Override database.url
    /// - POSTGREMOTE_JWT_SECRET: Override auth.jwt_secret
    /// - POSTGREMOTE_DEFAULT_ROLE: Override auth.default_role
    /// - POSTGREMOTE_LOG_LEVEL: Override logging.level
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("POSTGREMOTE_SERVER_HOST") {
            self.server.host = host;
        }

        if let Some(port_str) = lookup("POSTGREMOTE_SERVER_PORT") {
            self.server.port = port_str.parse().map_err(|_| {
                anyhow::anyhow!("Invalid POSTGREMOTE_SERVER_PORT value: {}", port_str)
            })?;
        }

        if let Some(url) = lookup("POSTGREMOTE_DATABASE_URL") {
            self.database.url = url;
        }

        if let Some(secret) = lookup("POSTGREMOTE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(role) = lookup("POSTGREMOTE_DEFAULT_ROLE") {
            self.auth.default_role = if role.is_empty() { None } else { Some(role) };
        }

        if let Some(level) = lookup("POSTGREMOTE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate after environment overrides have been applied.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.logging.level = self.logging.level.to_lowercase();
        self.logging.format = self.logging.format.to_lowercase();
        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "auth.jwt_secret cannot be empty (set it in config or POSTGREMOTE_JWT_SECRET)"
            ));
        }

        if self.auth.token_expiry_secs <= 0 || self.auth.token_expiry_secs > MAX_TOKEN_EXPIRY_SECS {
            return Err(anyhow::anyhow!(
                "auth.token_expiry_secs must be between 1 and {} (got {})",
                MAX_TOKEN_EXPIRY_SECS,
                self.auth.token_expiry_secs
            ));
        }

        if let Some(role) = &self.auth.default_role {
            escape_identifier(role)
                .map_err(|e| anyhow::anyhow!("Invalid auth.default_role: {}", e))?;
        }

        if let Some(role) = self.database.neutral_role() {
            escape_identifier(role)
                .map_err(|e| anyhow::anyhow!("Invalid database.neutral_role: {}", e))?;
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("database.max_connections cannot be 0"));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(anyhow::anyhow!(
                "database.min_connections ({}) cannot exceed max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            ));
        }

        if self.gateway.max_body_bytes == 0 {
            return Err(anyhow::anyhow!("gateway.max_body_bytes cannot be 0"));
        }

        Ok(())
    }
}

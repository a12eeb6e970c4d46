//! Server lifecycle management helpers.
//!
//! Builds the shared gateway state from configuration, wires the HTTP
//! server, and coordinates graceful shutdown.

use crate::middleware;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use log::{debug, info};
use postgremote_api::{configure_routes, ConnectionPool, ExecutorSettings, PgConnectionPool, RequestExecutor};
use postgremote_configs::ServerConfig;
use postgremote_sql::EntityRegistry;
use std::sync::Arc;

/// Shared state handed to every HTTP worker.
pub struct ApplicationComponents {
    pub executor: Arc<RequestExecutor>,
    pub pool: Arc<dyn ConnectionPool>,
}

/// Entity registry from the `[[tables]]`, `[[roles]]` and `[[functions]]`
/// sections.
pub fn build_registry(config: &ServerConfig) -> Result<EntityRegistry> {
    let registry = EntityRegistry::with_entities(
        config.tables.iter().cloned(),
        config.roles.iter().cloned(),
        config.functions.iter().cloned(),
    )
    .context("Invalid entity definitions in config")?;

    let token_functions: Vec<&str> = registry
        .functions()
        .filter(|f| f.marks_token_result())
        .map(|f| f.name())
        .collect();
    info!(
        "Registered {} tables, {} roles, {} functions (token-producing: {:?})",
        registry.tables().count(),
        registry.roles().count(),
        registry.functions().count(),
        token_functions
    );

    Ok(registry)
}

/// Assemble components around an existing pool.
pub fn build_components(config: &ServerConfig, pool: Arc<dyn ConnectionPool>) -> Result<ApplicationComponents> {
    let registry = Arc::new(build_registry(config)?);
    let settings = ExecutorSettings::from_config(config).context("Invalid auth settings")?;

    match &settings.default_role {
        Some(role) => info!("Unauthenticated requests run as role {:?}", role.name()),
        None => info!("Unauthenticated requests are rejected (no default role)"),
    }

    let executor = Arc::new(RequestExecutor::new(pool.clone(), registry, settings));
    Ok(ApplicationComponents { executor, pool })
}

/// Connect the Postgres pool and build the shared state.
pub async fn bootstrap(config: &ServerConfig) -> Result<ApplicationComponents> {
    info!(
        "Connecting to database (max_connections={}, acquire_timeout={}s)",
        config.database.max_connections, config.database.acquire_timeout_secs
    );
    let pool = PgConnectionPool::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    build_components(config, Arc::new(pool))
}

/// Start the HTTP server and manage graceful shutdown.
pub async fn run(config: &ServerConfig, components: ApplicationComponents) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {}", bind_addr);
    debug!("Endpoints: POST /, POST /v1/api/jsql, POST /v1/api/logout, GET /v1/api/healthcheck");

    let executor = components.executor.clone();
    let cors_config = config.security.cors.clone();
    let max_body_bytes = config.gateway.max_body_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::request_logger())
            .wrap(middleware::build_cors_from_config(&cors_config))
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .app_data(web::Data::new(executor.clone()))
            .configure(configure_routes)
    });

    // 0 keeps actix's default of one worker per CPU
    let server = if config.server.workers > 0 {
        server.workers(config.server.workers)
    } else {
        server
    };

    let server = server
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind {}", bind_addr))?
        .disable_signals()
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => log::error!("Server failed: {}", e),
                Err(e) => log::error!("Server task failed: {}", e),
                Ok(Ok(())) => {},
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
            server_handle.stop(true).await;
        }
    }

    info!("Closing database pool...");
    components.pool.close().await;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use postgremote_api::{PoolError, PoolResult, PooledConnection};

    struct ClosedPool;

    #[async_trait]
    impl ConnectionPool for ClosedPool {
        async fn acquire(&self) -> PoolResult<Box<dyn PooledConnection>> {
            Err(PoolError::Unavailable("closed".into()))
        }
    }

    const CONFIG: &str = r#"
        [auth]
        jwt_secret = "s3cret"
        default_role = "anonymous"

        [[roles]]
        name = "anonymous"

        [[functions]]
        name = "login"
        marks_token_result = true
        parameters = [
            { name = "username", settings = { data_type = "text" } },
            { name = "password", settings = { data_type = "text" } },
        ]

        [[functions]]
        name = "search"
        parameters = [{ name = "term", settings = { data_type = "text" } }]
    "#;

    #[test]
    fn test_build_registry_from_config() {
        let config = ServerConfig::from_toml_str(CONFIG).unwrap();
        let registry = build_registry(&config).unwrap();

        assert!(registry.role("anonymous").is_some());
        assert!(registry.function("login").unwrap().marks_token_result());
        assert!(!registry.function("search").unwrap().marks_token_result());
    }

    #[test]
    fn test_duplicate_function_is_rejected() {
        let mut config = ServerConfig::from_toml_str(CONFIG).unwrap();
        let duplicate = config.functions[0].clone();
        config.functions.push(duplicate);

        let err = build_registry(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("login"));
    }

    #[test]
    fn test_build_components() {
        let config = ServerConfig::from_toml_str(CONFIG).unwrap();
        let components = build_components(&config, Arc::new(ClosedPool)).unwrap();

        assert!(components.executor.has_default_role());
        assert_eq!(components.executor.settings().cookie.name, "jwt");
        assert!(components.executor.registry().function("login").is_some());
    }
}

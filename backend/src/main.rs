// postgremote server entrypoint
//!
//! Loading, logging and serving live in their own modules; this file only
//! orders them.

use anyhow::Result;
use log::info;
use postgremote_configs::ServerConfig;
use postgremote_server::lifecycle::{bootstrap, run};
use postgremote_server::logging;
use std::env;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[actix_web::main]
async fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match ServerConfig::load(&config_path) {
        Ok(cfg) => {
            eprintln!(
                "Loaded config from: {}",
                std::fs::canonicalize(&config_path)
                    .unwrap_or_else(|_| std::path::PathBuf::from(&config_path))
                    .display()
            );
            cfg
        },
        Err(e) => {
            eprintln!("FATAL: Failed to load {}: {:#}", config_path, e);
            std::process::exit(1);
        },
    };

    // Logging before any other side effects
    let server_log_path = format!("{}/server.log", config.logging.logs_path);
    logging::init_logging(
        &config.logging.level,
        &server_log_path,
        config.logging.log_to_console,
        Some(&config.logging.targets),
        &config.logging.format,
    )?;

    info!("postgremote v{}", env!("CARGO_PKG_VERSION"));
    info!("Host: {}  Port: {}", config.server.host, config.server.port);

    let components = bootstrap(&config).await?;
    run(&config, components).await
}

// Logging module, powered by tracing-subscriber
//
// Library crates log through the `log` facade. `tracing_log::LogTracer`
// routes those records into the tracing subscriber installed here. The
// subscriber is built without its own `tracing-log` feature, so `try_init`
// only sets the global dispatcher and the bridge is installed exactly once.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Third-party crates that are clamped regardless of the base level.
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("actix_server", "warn"),
    ("actix_web", "warn"),
    ("sqlx", "warn"),
    ("h2", "warn"),
    ("tracing", "warn"),
];

/// Build the `EnvFilter` from the base level, the noisy-crate clamps and
/// optional per-target overrides from config. Overrides come last so they
/// win over the clamps.
pub fn build_env_filter(
    level: &str,
    target_levels: Option<&HashMap<String, String>>,
) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![level.to_string()];

    for (target, lvl) in NOISY_TARGETS {
        directives.push(format!("{}={}", target, lvl));
    }

    if let Some(map) = target_levels {
        let mut targets: Vec<_> = map.iter().collect();
        targets.sort();
        for (target, lvl) in targets {
            directives.push(format!("{}={}", target, lvl));
        }
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Initialize logging based on configuration.
///
/// Sets up `tracing-subscriber` with:
///  - Colored console layer (when `log_to_console` is true)
///  - File layer (compact text or JSON lines)
///  - `tracing_log::LogTracer` bridge so that all `log::*` calls are captured
pub fn init_logging(
    level: &str,
    file_path: &str,
    log_to_console: bool,
    target_levels: Option<&HashMap<String, String>>,
    format: &str,
) -> anyhow::Result<()> {
    let log_format = LogFormat::parse(format);

    if let Some(parent) = Path::new(file_path).parent() {
        fs::create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new().create(true).append(true).open(file_path)?;

    // ok() in case a bridge is already installed
    tracing_log::LogTracer::init().ok();

    let console_layer = if log_to_console {
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(true)
                .with_thread_names(true)
                .with_filter(build_env_filter(level, target_levels)?),
        )
    } else {
        None
    };

    let file_layer = if log_format == LogFormat::Json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(log_file)
            .with_target(true)
            .with_thread_names(true)
            .with_filter(build_env_filter(level, target_levels)?)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(log_file)
            .with_target(true)
            .with_thread_names(true)
            .with_filter(build_env_filter(level, target_levels)?)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::debug!(
        "Logging initialized: level={}, console={}, file={}, format={:?}",
        level,
        log_to_console,
        file_path,
        log_format
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("jsonl"), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Compact);
    }

    #[test]
    fn test_env_filter_includes_overrides() {
        let mut targets = HashMap::new();
        targets.insert("sqlx".to_string(), "debug".to_string());
        targets.insert("postgremote_api".to_string(), "trace".to_string());

        let filter = build_env_filter("info", Some(&targets)).unwrap().to_string();
        assert!(filter.contains("sqlx=debug"));
        assert!(filter.contains("postgremote_api=trace"));
        assert!(filter.contains("actix_web=warn"));
    }

    #[test]
    fn test_env_filter_rejects_garbage() {
        let mut targets = HashMap::new();
        targets.insert("sqlx".to_string(), "loud".to_string());
        assert!(build_env_filter("info", Some(&targets)).is_err());
    }
}

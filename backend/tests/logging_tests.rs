//! Logging bootstrap. Runs in its own test binary because the global
//! logger and subscriber can only be installed once per process.

use postgremote_server::logging::init_logging;
use std::fs;

#[test]
fn test_init_logging_installs_bridge_and_file_layer() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("server.log");
    let log_path = log_path.to_str().unwrap();

    init_logging("info", log_path, true, None, "compact").unwrap();

    log::info!("bridged record from the log facade");
    log::debug!("below the configured level");

    let contents = fs::read_to_string(log_path).unwrap();
    assert!(contents.contains("bridged record from the log facade"));
    assert!(!contents.contains("below the configured level"));

    // Second install fails instead of silently replacing the subscriber.
    assert!(init_logging("info", log_path, false, None, "compact").is_err());
}

//! postgremote-configs
//!
//! Server configuration types and loader for the postgremote gateway.

pub mod config;

pub use config::defaults;
pub use config::*;

//! postgremote server library
//!
//! Exposes the server modules for integration testing.

pub mod lifecycle;
pub mod logging;
pub mod middleware;

//! HTTP request handlers
//!
//! - POST / and POST /v1/api/jsql - run one statement under the caller's role
//! - POST /v1/api/logout - clear the credential cookie
//! - GET /v1/api/healthcheck - liveness

mod health;
mod jsql;
mod logout;

pub use health::healthcheck_handler;
pub use jsql::jsql_handler;
pub use logout::logout_handler;

//! postgremote gateway
//!
//! Runs client-submitted JSQL statements against Postgres under the role
//! named by the caller's credential, and relays credentials minted by
//! token-producing functions back as an HttpOnly cookie.

pub mod error;
pub mod executor;
pub mod handlers;
pub mod models;
pub mod pool;
pub mod routes;
pub mod token;

pub use error::{GatewayError, GatewayResult};
pub use executor::{ExecutionOutcome, ExecutorSettings, RequestExecutor};
pub use pool::{
    ColumnInfo, ConnectionPool, PgConnectionPool, PoolError, PoolResult, PooledConnection,
    PreparedQuery, QueryOutput,
};
pub use routes::configure_routes;

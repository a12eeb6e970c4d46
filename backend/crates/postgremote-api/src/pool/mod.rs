//! Connection pool abstraction.
//!
//! The executor only needs three things from a database: borrow a
//! connection, switch its role, and run one parameterized statement. A
//! borrowed connection goes back to the pool when it is dropped, and the
//! pool restores a neutral role at that point, so a role set for one request
//! is never visible to the next one.

mod postgres;

pub use postgres::PgConnectionPool;

use async_trait::async_trait;
use postgremote_sql::{DataType, Role, ValueMap};
use serde_json::Value;
use thiserror::Error;

pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No connection could be borrowed (exhausted, closed, unreachable).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// `SET ROLE` was refused.
    #[error("{0}")]
    Role(String),

    /// The statement failed. Carries the database message.
    #[error("{0}")]
    Query(String),

    /// A result value could not be turned into JSON.
    #[error("Failed to decode column {column}: {message}")]
    Decode { column: String, message: String },
}

/// A compiled statement ready to run, with the declared type of each bind
/// parameter so `NULL` arguments can be sent with the right type.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub text: String,
    pub parameters: Vec<Value>,
    pub parameter_types: Vec<DataType>,
}

impl PreparedQuery {
    pub fn new(text: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            parameters,
            parameter_types: Vec::new(),
        }
    }

    pub fn with_types(mut self, parameter_types: Vec<DataType>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    pub fn parameter_type(&self, index: usize) -> Option<DataType> {
        self.parameter_types.get(index).copied()
    }
}

/// Name and database type of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Lowercase type name as the database reports it, e.g. `text`, `jwt_token`.
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into().to_lowercase(),
        }
    }
}

/// Rows of one statement, each keyed by column name in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<ValueMap>,
}

impl QueryOutput {
    /// First column of the first row.
    pub fn first_value(&self) -> Option<(&ColumnInfo, &Value)> {
        let column = self.columns.first()?;
        let row = self.rows.first()?;
        row.get(&column.name).map(|value| (column, value))
    }
}

#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Borrow a connection. May wait while the pool is exhausted.
    async fn acquire(&self) -> PoolResult<Box<dyn PooledConnection>>;

    async fn close(&self) {}
}

#[async_trait]
pub trait PooledConnection: Send {
    /// `SET ROLE "<role>"` for the rest of this borrow.
    async fn set_role(&mut self, role: &Role) -> PoolResult<()>;

    async fn query(&mut self, query: &PreparedQuery) -> PoolResult<QueryOutput>;
}

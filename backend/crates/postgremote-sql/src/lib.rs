//! JSQL - typed statements compiled to parameterized Postgres SQL
//!
//! Application code describes tables, roles, functions and statements as
//! values. The compiler turns a statement into `{text, parameters}`; all
//! identifiers are quoted by the escaper and all user values travel as bind
//! parameters.
//!
//! # Example
//!
//! ```
//! use postgremote_sql::jsql;
//! use postgremote_sql::{ColumnSettings, QueryGenerator};
//!
//! # fn example() -> postgremote_sql::JsqlResult<()> {
//! let user = jsql::table(
//!     "User",
//!     vec![
//!         jsql::column("firstName", ColumnSettings::text())?,
//!         jsql::column("lastName", ColumnSettings::text())?,
//!     ],
//! )?;
//!
//! let compiled = jsql::insert(&user, [("firstName", "A"), ("lastName", "B")])?.compile()?;
//! assert_eq!(
//!     compiled.text,
//!     r#"INSERT INTO "User" ("firstName", "lastName") VALUES ($1, $2)"#
//! );
//!
//! let compiled = jsql::select([user.all()]).from(&user).compile()?;
//! assert_eq!(compiled.text, r#"SELECT "User".* FROM "User""#);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod builder;
pub mod compiler;
pub mod error;
pub mod escape;
pub mod keywords;
pub mod models;
pub mod registry;
pub mod statement;

pub use builder::QueryGenerator;
pub use compiler::{compile, CompiledStatement};
pub use error::{JsqlError, JsqlResult};
pub use escape::{escape_identifier, escape_literal};
pub use keywords::Privilege;
pub use models::{
    AsteriskColumn, ColumnSettings, DataType, Entity, FreeColumn, Function, LinkedColumn, Role,
    SelectExpression, Table,
};
pub use registry::EntityRegistry;
pub use statement::Statement;

/// Column or parameter name to value, in insertion order.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;

/// The statement DSL in one namespace: `jsql::table`, `jsql::select`, ...
pub mod jsql {
    pub use crate::builder::{create, drop, grant, insert, revoke, select};
    pub use crate::models::{
        define_column as column, define_function as function, define_role as role,
        define_table as table,
    };
}

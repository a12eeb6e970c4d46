//! Entity descriptors: columns, tables, roles and stored functions.
//!
//! Descriptors are built once at startup and never mutated afterwards, so
//! they can be shared freely between request handlers.

pub mod column;
pub mod function;
pub mod role;
pub mod table;

pub use column::{
    AsteriskColumn, ColumnSettings, DataType, FreeColumn, LinkedColumn, SelectExpression,
};
pub use function::{Function, FunctionDefinition};
pub use role::{Role, RoleDefinition};
pub use table::{Table, TableDefinition};

use crate::error::JsqlResult;
use serde::{Deserialize, Serialize};

/// Target of a CREATE or DROP statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Table(Table),
    Role(Role),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Table(t) => t.name(),
            Entity::Role(r) => r.name(),
        }
    }
}

impl From<Table> for Entity {
    fn from(table: Table) -> Self {
        Entity::Table(table)
    }
}

impl From<&Table> for Entity {
    fn from(table: &Table) -> Self {
        Entity::Table(table.clone())
    }
}

impl From<Role> for Entity {
    fn from(role: Role) -> Self {
        Entity::Role(role)
    }
}

impl From<&Role> for Entity {
    fn from(role: &Role) -> Self {
        Entity::Role(role.clone())
    }
}

pub fn define_column(name: impl Into<String>, settings: ColumnSettings) -> JsqlResult<FreeColumn> {
    FreeColumn::define(name, settings)
}

pub fn define_table(name: impl Into<String>, columns: Vec<FreeColumn>) -> JsqlResult<Table> {
    Table::define(name, columns)
}

pub fn define_role(name: impl Into<String>) -> JsqlResult<Role> {
    Role::define(name)
}

pub fn define_function(
    name: impl Into<String>,
    parameters: Vec<FreeColumn>,
    marks_token_result: bool,
) -> JsqlResult<Function> {
    Function::define(name, parameters, marks_token_result)
}

//! Statement AST.
//!
//! One variant per operation. Every node carries all the schema information
//! the compiler needs, so compilation never consults outside state.
//!
//! Wire form (JSON), tagged by `kind`:
//!
//! ```json
//! {"kind": "select", "columns": [{"kind": "asterisk", "table": "User"}], "from": {"name": "User"}}
//! {"kind": "insert", "into": {"name": "User", "columns": [...]}, "values": {"firstName": "A"}}
//! {"kind": "grant", "privilege": "select", "on": {"name": "User"}, "to": {"name": "reader"}}
//! {"kind": "execute", "function": {"name": "login", "parameters": [...]}, "args": {...}}
//! ```

use crate::compiler::{compile, CompiledStatement};
use crate::error::{JsqlError, JsqlResult};
use crate::keywords::Privilege;
use crate::models::{DataType, Entity, Function, Role, SelectExpression, Table};
use crate::ValueMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Select(SelectStatement),
    Create(CreateStatement),
    Drop(DropStatement),
    Insert(InsertStatement),
    Grant(GrantStatement),
    Revoke(RevokeStatement),
    Execute(ExecuteStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    #[serde(default)]
    pub columns: Vec<SelectExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStatement {
    pub target: Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropStatement {
    pub target: Entity,
    #[serde(default, alias = "ifExists")]
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    pub into: Table,
    /// Column name to value, in insertion order.
    #[serde(default)]
    pub values: ValueMap,
}

/// `privilege` is kept as written so the compiler can validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantStatement {
    pub privilege: String,
    pub on: Table,
    pub to: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevokeStatement {
    pub privilege: String,
    pub on: Table,
    pub from: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteStatement {
    pub function: Function,
    #[serde(default)]
    pub args: ValueMap,
}

impl Statement {
    /// Lowercase operation name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "select",
            Statement::Create(_) => "create",
            Statement::Drop(_) => "drop",
            Statement::Insert(_) => "insert",
            Statement::Grant(_) => "grant",
            Statement::Revoke(_) => "revoke",
            Statement::Execute(_) => "execute",
        }
    }

    /// Run the construction-time checks the builders perform.
    ///
    /// Statements that arrive over the wire skip the builders, so the
    /// executor calls this before compiling them.
    pub fn validate(&self) -> JsqlResult<()> {
        match self {
            Statement::Select(select) => {
                if select.from.is_none() {
                    return Err(JsqlError::MissingFrom);
                }
                Ok(())
            },
            Statement::Insert(insert) => validate_insert(&insert.into, &insert.values),
            Statement::Grant(grant) => Privilege::parse(&grant.privilege).map(|_| ()),
            Statement::Revoke(revoke) => Privilege::parse(&revoke.privilege).map(|_| ()),
            Statement::Create(_) | Statement::Drop(_) | Statement::Execute(_) => Ok(()),
        }
    }

    pub fn compile(&self) -> JsqlResult<CompiledStatement> {
        compile(self)
    }

    /// The token-producing function this statement calls, if any.
    pub fn token_function(&self) -> Option<&Function> {
        match self {
            Statement::Execute(exec) if exec.function.marks_token_result() => Some(&exec.function),
            _ => None,
        }
    }

    /// Declared data type of each bind parameter, aligned with
    /// `compile(..).parameters`. Lets a driver type `NULL` arguments.
    pub fn parameter_types(&self) -> Vec<DataType> {
        match self {
            Statement::Insert(insert) => insert
                .values
                .keys()
                .map(|key| {
                    insert
                        .into
                        .free_column(key)
                        .map(|c| c.settings.data_type)
                        .unwrap_or_default()
                })
                .collect(),
            Statement::Execute(exec) => exec
                .function
                .parameters()
                .iter()
                .map(|p| p.settings.data_type)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Insert checks, in order: empty mapping, unknown keys, missing required
/// columns, value types.
pub(crate) fn validate_insert(table: &Table, values: &ValueMap) -> JsqlResult<()> {
    if values.is_empty() {
        return Err(JsqlError::EmptyInsert(table.name().to_string()));
    }

    for key in values.keys() {
        if !table.has_column(key) {
            return Err(JsqlError::unknown_column(table.name(), key.as_str()));
        }
    }

    for required in table.required_columns() {
        if !values.contains_key(required) {
            return Err(JsqlError::MissingRequiredColumn {
                table: table.name().to_string(),
                column: required.clone(),
            });
        }
    }

    for (key, value) in values {
        if let Some(column) = table.free_column(key) {
            column.settings.check_value(key, value)?;
        }
    }

    Ok(())
}

//! Table descriptor.

use super::column::{AsteriskColumn, FreeColumn, LinkedColumn};
use crate::error::{JsqlError, JsqlResult};
use crate::escape::escape_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Wire/config form of a table: a name and its free columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<FreeColumn>,
}

/// An immutable table descriptor.
///
/// Column names are unique. The set of required columns (neither nullable
/// nor defaultable) is computed once at definition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct Table {
    name: String,
    columns: Vec<FreeColumn>,
    required: Vec<String>,
}

impl Table {
    /// Define a table.
    ///
    /// # Errors
    /// - `InvalidIdentifier` for an unusable table or column name
    /// - `DuplicateColumn` when two columns share a name
    /// - `DefaultTypeMismatch` from any column
    pub fn define(name: impl Into<String>, columns: Vec<FreeColumn>) -> JsqlResult<Self> {
        let name = name.into();
        escape_identifier(&name)?;

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            column.validate()?;
            if !seen.insert(column.name.as_str()) {
                return Err(JsqlError::DuplicateColumn {
                    owner: name,
                    column: column.name.clone(),
                });
            }
        }

        let required = columns
            .iter()
            .filter(|c| c.settings.is_required())
            .map(|c| c.name.clone())
            .collect();

        Ok(Self {
            name,
            columns,
            required,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    #[inline]
    pub fn columns(&self) -> &[FreeColumn] {
        &self.columns
    }

    /// Names of columns an insert must supply.
    #[inline]
    pub fn required_columns(&self) -> &[String] {
        &self.required
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn free_column(&self, name: &str) -> Option<&FreeColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Linked reference to one column.
    pub fn column(&self, name: &str) -> JsqlResult<LinkedColumn> {
        self.free_column(name)
            .map(|c| c.link(self.name.clone()))
            .ok_or_else(|| JsqlError::unknown_column(&self.name, name))
    }

    /// Linked references to every column, in declaration order.
    pub fn linked_columns(&self) -> impl Iterator<Item = LinkedColumn> + '_ {
        self.columns.iter().map(move |c| c.link(self.name.clone()))
    }

    /// The `"T".*` reference.
    pub fn all(&self) -> AsteriskColumn {
        AsteriskColumn {
            table: self.name.clone(),
        }
    }
}

impl TryFrom<TableDefinition> for Table {
    type Error = JsqlError;

    fn try_from(def: TableDefinition) -> Result<Self, Self::Error> {
        Table::define(def.name, def.columns)
    }
}

impl From<Table> for TableDefinition {
    fn from(table: Table) -> Self {
        TableDefinition {
            name: table.name,
            columns: table.columns,
        }
    }
}

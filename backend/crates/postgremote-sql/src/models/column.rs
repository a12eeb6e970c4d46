//! Column descriptors: free, linked and asterisk.

use crate::error::{JsqlError, JsqlResult};
use crate::escape::escape_identifier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Column data type. Drives the DDL type and value checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Boolean,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
        }
    }

    /// Postgres type used in `CREATE TABLE`.
    pub fn ddl_type(self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "numeric",
            DataType::Boolean => "boolean",
        }
    }

    /// Whether a non-null JSON value is of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            DataType::Text => value.is_string(),
            DataType::Number => value.is_number(),
            DataType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column settings shared by table columns and function parameters.
///
/// `nullable` and `defaultable` are independent: a column may be both,
/// either, or neither. A column that is neither is required on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    #[serde(default, alias = "data_type")]
    pub data_type: DataType,
    #[serde(default, alias = "default_value", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub defaultable: bool,
}

impl ColumnSettings {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Default::default()
        }
    }

    pub fn text() -> Self {
        Self::new(DataType::Text)
    }

    pub fn number() -> Self {
        Self::new(DataType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(DataType::Boolean)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn defaultable(mut self) -> Self {
        self.defaultable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Neither nullable nor defaultable.
    #[inline]
    pub fn is_required(&self) -> bool {
        !self.nullable && !self.defaultable
    }

    /// Check a supplied value against the type and nullability of `column`.
    pub(crate) fn check_value(&self, column: &str, value: &Value) -> JsqlResult<()> {
        let ok = match value {
            Value::Null => self.nullable,
            v => self.data_type.accepts(v),
        };
        if ok {
            Ok(())
        } else {
            Err(JsqlError::TypeMismatch {
                column: column.to_string(),
                data_type: self.data_type.to_string(),
                value: value.to_string(),
            })
        }
    }
}

/// A column not yet attached to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeColumn {
    pub name: String,
    #[serde(default)]
    pub settings: ColumnSettings,
}

impl FreeColumn {
    /// Define a column.
    ///
    /// Fails with `InvalidIdentifier` for an unusable name and with
    /// `DefaultTypeMismatch` when the default value disagrees with the type.
    pub fn define(name: impl Into<String>, settings: ColumnSettings) -> JsqlResult<Self> {
        let column = Self {
            name: name.into(),
            settings,
        };
        column.validate()?;
        Ok(column)
    }

    pub(crate) fn validate(&self) -> JsqlResult<()> {
        escape_identifier(&self.name)?;
        match &self.settings.default_value {
            Some(value) if !value.is_null() && !self.settings.data_type.accepts(value) => {
                Err(JsqlError::DefaultTypeMismatch {
                    column: self.name.clone(),
                    data_type: self.settings.data_type.to_string(),
                    value: value.to_string(),
                })
            },
            _ => Ok(()),
        }
    }

    /// Bind this column to a table.
    pub fn link(&self, table: impl Into<String>) -> LinkedColumn {
        LinkedColumn {
            table: table.into(),
            column: self.name.clone(),
            alias: None,
            settings: self.settings.clone(),
        }
    }
}

/// A column bound to a table, optionally with an output alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedColumn {
    pub table: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub settings: ColumnSettings,
}

impl LinkedColumn {
    /// Same column rendered `AS "<alias>"`.
    pub fn alias(&self, alias: impl Into<String>) -> LinkedColumn {
        LinkedColumn {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }
}

/// All columns of a table (`"T".*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteriskColumn {
    pub table: String,
}

/// Anything that can appear in a select list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectExpression {
    Asterisk(AsteriskColumn),
    Linked(LinkedColumn),
}

impl From<AsteriskColumn> for SelectExpression {
    fn from(column: AsteriskColumn) -> Self {
        SelectExpression::Asterisk(column)
    }
}

impl From<LinkedColumn> for SelectExpression {
    fn from(column: LinkedColumn) -> Self {
        SelectExpression::Linked(column)
    }
}

impl From<&LinkedColumn> for SelectExpression {
    fn from(column: &LinkedColumn) -> Self {
        SelectExpression::Linked(column.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_flags_are_independent() {
        assert!(ColumnSettings::text().is_required());
        assert!(!ColumnSettings::text().nullable().is_required());
        assert!(!ColumnSettings::text().defaultable().is_required());
        assert!(!ColumnSettings::text().nullable().defaultable().is_required());
    }

    #[test]
    fn test_define_rejects_mismatched_default() {
        let err = FreeColumn::define("c", ColumnSettings::text().default_value(true)).unwrap_err();
        assert!(matches!(err, JsqlError::DefaultTypeMismatch { .. }));

        let err = FreeColumn::define("c", ColumnSettings::number().default_value("2")).unwrap_err();
        assert!(matches!(err, JsqlError::DefaultTypeMismatch { .. }));

        let err = FreeColumn::define("c", ColumnSettings::boolean().default_value(0)).unwrap_err();
        assert!(matches!(err, JsqlError::DefaultTypeMismatch { .. }));
    }

    #[test]
    fn test_define_rejects_bad_name() {
        assert!(matches!(
            FreeColumn::define("a;b", ColumnSettings::text()),
            Err(JsqlError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_check_value() {
        let required = ColumnSettings::text();
        assert!(required.check_value("c", &json!("x")).is_ok());
        assert!(required.check_value("c", &json!(null)).is_err());
        assert!(required.check_value("c", &json!(1)).is_err());

        let nullable = ColumnSettings::number().nullable();
        assert!(nullable.check_value("c", &json!(null)).is_ok());
        assert!(nullable.check_value("c", &json!(3.5)).is_ok());
    }

    #[test]
    fn test_alias_keeps_original() {
        let linked = FreeColumn::define("firstName", ColumnSettings::text())
            .unwrap()
            .link("User");
        let aliased = linked.alias("name");
        assert_eq!(linked.alias, None);
        assert_eq!(aliased.alias.as_deref(), Some("name"));
        assert_eq!(aliased.table, "User");
    }

    #[test]
    fn test_select_expression_wire_shape() {
        let expr: SelectExpression =
            serde_json::from_value(json!({"kind": "asterisk", "table": "T"})).unwrap();
        assert_eq!(expr, SelectExpression::Asterisk(AsteriskColumn { table: "T".into() }));

        let expr: SelectExpression = serde_json::from_value(
            json!({"kind": "linked", "table": "T", "column": "c", "alias": "x"}),
        )
        .unwrap();
        match expr {
            SelectExpression::Linked(l) => assert_eq!(l.alias.as_deref(), Some("x")),
            other => panic!("unexpected {:?}", other),
        }
    }
}

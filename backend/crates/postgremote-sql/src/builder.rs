//! Fluent statement builders.
//!
//! Builders validate at construction time (empty inserts, unknown
//! privileges, required columns). The compiler repeats the checks that
//! matter for safety, so a hand-built AST gets the same guarantees.

use crate::compiler::{compile, CompiledStatement};
use crate::error::{JsqlError, JsqlResult};
use crate::keywords::Privilege;
use crate::models::{Entity, Function, Role, SelectExpression, Table};
use crate::statement::{
    validate_insert, CreateStatement, DropStatement, ExecuteStatement, GrantStatement,
    InsertStatement, RevokeStatement, SelectStatement, Statement,
};
use crate::ValueMap;
use serde_json::Value;

/// Anything that produces a statement.
pub trait QueryGenerator {
    fn to_statement(&self) -> JsqlResult<Statement>;

    fn compile(&self) -> JsqlResult<CompiledStatement> {
        compile(&self.to_statement()?)
    }
}

impl QueryGenerator for Statement {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct SelectGenerator {
    columns: Vec<SelectExpression>,
    from: Option<Table>,
}

impl SelectGenerator {
    pub fn from(mut self, table: &Table) -> Self {
        self.from = Some(table.clone());
        self
    }
}

impl QueryGenerator for SelectGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        let from = self.from.clone().ok_or(JsqlError::MissingFrom)?;
        Ok(Statement::Select(SelectStatement {
            columns: self.columns.clone(),
            from: Some(from),
        }))
    }
}

/// `select(..).from(table)`.
pub fn select<I, E>(expressions: I) -> SelectGenerator
where
    I: IntoIterator<Item = E>,
    E: Into<SelectExpression>,
{
    SelectGenerator {
        columns: expressions.into_iter().map(Into::into).collect(),
        from: None,
    }
}

#[derive(Debug, Clone)]
pub struct InsertGenerator {
    statement: InsertStatement,
}

impl QueryGenerator for InsertGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(Statement::Insert(self.statement.clone()))
    }
}

/// Build an insert. Key order decides placeholder order.
///
/// # Errors
/// `EmptyInsert`, `UnknownColumn`, `MissingRequiredColumn`, `TypeMismatch`.
pub fn insert<I, K, V>(table: &Table, values: I) -> JsqlResult<InsertGenerator>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let values: ValueMap = values.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    validate_insert(table, &values)?;
    Ok(InsertGenerator {
        statement: InsertStatement {
            into: table.clone(),
            values,
        },
    })
}

#[derive(Debug, Clone)]
pub struct CreateGenerator {
    target: Entity,
}

impl QueryGenerator for CreateGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(Statement::Create(CreateStatement {
            target: self.target.clone(),
        }))
    }
}

pub fn create(entity: impl Into<Entity>) -> CreateGenerator {
    CreateGenerator {
        target: entity.into(),
    }
}

#[derive(Debug, Clone)]
pub struct DropGenerator {
    target: Entity,
    if_exists: bool,
}

impl QueryGenerator for DropGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(Statement::Drop(DropStatement {
            target: self.target.clone(),
            if_exists: self.if_exists,
        }))
    }
}

pub fn drop(entity: impl Into<Entity>, if_exists: bool) -> DropGenerator {
    DropGenerator {
        target: entity.into(),
        if_exists,
    }
}

#[derive(Debug, Clone)]
pub struct GrantGenerator {
    privilege: Privilege,
    on: Table,
    to: Role,
}

impl QueryGenerator for GrantGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(Statement::Grant(GrantStatement {
            privilege: self.privilege.as_str().to_string(),
            on: self.on.clone(),
            to: self.to.clone(),
        }))
    }
}

/// `grant("select", on, to)`; `UnknownPrivilege` unless SELECT or INSERT.
pub fn grant(privilege: &str, on: &Table, to: &Role) -> JsqlResult<GrantGenerator> {
    Ok(GrantGenerator {
        privilege: Privilege::parse(privilege)?,
        on: on.clone(),
        to: to.clone(),
    })
}

#[derive(Debug, Clone)]
pub struct RevokeGenerator {
    privilege: Privilege,
    on: Table,
    from: Role,
}

impl QueryGenerator for RevokeGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(Statement::Revoke(RevokeStatement {
            privilege: self.privilege.as_str().to_string(),
            on: self.on.clone(),
            from: self.from.clone(),
        }))
    }
}

pub fn revoke(privilege: &str, on: &Table, from: &Role) -> JsqlResult<RevokeGenerator> {
    Ok(RevokeGenerator {
        privilege: Privilege::parse(privilege)?,
        on: on.clone(),
        from: from.clone(),
    })
}

/// Produced by [`Function::call`].
#[derive(Debug, Clone)]
pub struct ExecuteGenerator {
    function: Function,
    args: ValueMap,
}

impl ExecuteGenerator {
    pub(crate) fn new(function: Function, args: ValueMap) -> Self {
        Self { function, args }
    }

    pub fn args(&self) -> &ValueMap {
        &self.args
    }
}

impl QueryGenerator for ExecuteGenerator {
    fn to_statement(&self) -> JsqlResult<Statement> {
        Ok(Statement::Execute(ExecuteStatement {
            function: self.function.clone(),
            args: self.args.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnSettings, FreeColumn};
    use serde_json::json;

    fn test_table() -> Table {
        Table::define(
            "TestTable",
            vec![
                FreeColumn::define("isNullable", ColumnSettings::boolean().nullable()).unwrap(),
                FreeColumn::define(
                    "withDefault",
                    ColumnSettings::number().default_value(2).defaultable(),
                )
                .unwrap(),
                FreeColumn::define(
                    "withDefaultAndNullable",
                    ColumnSettings::text().default_value("string").defaultable().nullable(),
                )
                .unwrap(),
                FreeColumn::define("required", ColumnSettings::text()).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_select_without_from_fails() {
        let table = test_table();
        let generator = select([table.all()]);
        assert_eq!(generator.to_statement(), Err(JsqlError::MissingFrom));
        assert_eq!(generator.compile(), Err(JsqlError::MissingFrom));
        assert!(generator.from(&table).compile().is_ok());
    }

    #[test]
    fn test_insert_required_columns() {
        let table = test_table();
        assert!(matches!(
            insert(&table, Vec::<(String, Value)>::new()),
            Err(JsqlError::EmptyInsert(_))
        ));
        assert!(matches!(
            insert(&table, [("isNullable", json!(false))]),
            Err(JsqlError::MissingRequiredColumn { .. })
        ));
        assert!(insert(&table, [("required", "this field is required")]).is_ok());
        assert!(insert(
            &table,
            [
                ("isNullable", json!(false)),
                ("withDefault", json!(20)),
                ("withDefaultAndNullable", json!("should work")),
                ("required", json!("this field is required")),
            ]
        )
        .is_ok());
    }

    #[test]
    fn test_insert_unknown_key_is_reported_before_missing_required() {
        let table = test_table();
        assert!(matches!(
            insert(&table, [("bogus", json!(1))]),
            Err(JsqlError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_insert_value_types() {
        let table = test_table();
        assert!(matches!(
            insert(&table, [("required", json!(1))]),
            Err(JsqlError::TypeMismatch { .. })
        ));
        assert!(matches!(
            insert(&table, [("required", json!(null))]),
            Err(JsqlError::TypeMismatch { .. })
        ));
        assert!(insert(&table, [("required", json!("x")), ("isNullable", json!(null))]).is_ok());
    }

    #[test]
    fn test_grant_rejects_unknown_privilege() {
        let table = test_table();
        let role = Role::define("reader").unwrap();
        assert!(matches!(grant("update", &table, &role), Err(JsqlError::UnknownPrivilege(_))));
        assert!(matches!(revoke("all", &table, &role), Err(JsqlError::UnknownPrivilege(_))));
        assert_eq!(
            grant("insert", &table, &role).unwrap().compile().unwrap().text,
            "GRANT INSERT ON \"TestTable\" TO \"reader\""
        );
    }

    #[test]
    fn test_create_dispatches_on_entity() {
        let role = Role::define("reader").unwrap();
        assert_eq!(create(&role).compile().unwrap().text, "CREATE ROLE \"reader\"");
        assert_eq!(drop(&role, true).compile().unwrap().text, "DROP ROLE IF EXISTS \"reader\"");
        assert_eq!(
            drop(&test_table(), false).compile().unwrap().text,
            "DROP TABLE \"TestTable\""
        );
    }
}

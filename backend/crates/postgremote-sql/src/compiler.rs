//! Statement compiler.
//!
//! `compile` maps a [`Statement`] to SQL text plus bind parameters. It is a
//! pure function: the same statement always compiles to the same output.
//! Identifiers and default literals go through [`crate::escape`]; insert
//! values and call arguments are only ever bind parameters.

use crate::error::{JsqlError, JsqlResult};
use crate::escape::{escape_identifier, escape_literal};
use crate::keywords::{ObjectKeyword, Privilege};
use crate::models::{DataType, Entity, FreeColumn, SelectExpression, Table};
use crate::statement::{
    CreateStatement, DropStatement, ExecuteStatement, GrantStatement, InsertStatement,
    RevokeStatement, SelectStatement, Statement,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// SQL text and its positional (`$1`, `$2`, ...) parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub text: String,
    pub parameters: Vec<Value>,
}

impl CompiledStatement {
    fn text_only(text: String) -> Self {
        Self {
            text,
            parameters: Vec::new(),
        }
    }
}

impl fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn compile(statement: &Statement) -> JsqlResult<CompiledStatement> {
    match statement {
        Statement::Select(s) => compile_select(s),
        Statement::Create(s) => compile_create(s),
        Statement::Drop(s) => compile_drop(s),
        Statement::Insert(s) => compile_insert(s),
        Statement::Grant(s) => compile_grant(s),
        Statement::Revoke(s) => compile_revoke(s),
        Statement::Execute(s) => compile_execute(s),
    }
}

fn compile_select(select: &SelectStatement) -> JsqlResult<CompiledStatement> {
    let from = select.from.as_ref().ok_or(JsqlError::MissingFrom)?;

    let expressions = select
        .columns
        .iter()
        .map(render_select_expression)
        .collect::<JsqlResult<Vec<_>>>()?
        .join(", ");

    let parts = [
        "SELECT".to_string(),
        expressions,
        format!("FROM {}", escape_identifier(from.name())?),
    ];
    let text = parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");

    Ok(CompiledStatement::text_only(text))
}

fn render_select_expression(expression: &SelectExpression) -> JsqlResult<String> {
    match expression {
        SelectExpression::Asterisk(a) => Ok(format!("{}.*", escape_identifier(&a.table)?)),
        SelectExpression::Linked(l) => {
            let mut rendered =
                format!("{}.{}", escape_identifier(&l.table)?, escape_identifier(&l.column)?);
            if let Some(alias) = &l.alias {
                rendered.push_str(" as ");
                rendered.push_str(&escape_identifier(alias)?);
            }
            Ok(rendered)
        },
    }
}

fn compile_create(create: &CreateStatement) -> JsqlResult<CompiledStatement> {
    let text = match &create.target {
        Entity::Table(table) => {
            let columns = table
                .columns()
                .iter()
                .map(render_column_definition)
                .collect::<JsqlResult<Vec<_>>>()?;
            format!(
                "CREATE TABLE {} ({})",
                escape_identifier(table.name())?,
                columns.join(", ")
            )
        },
        Entity::Role(role) => format!("CREATE ROLE {}", escape_identifier(role.name())?),
    };
    Ok(CompiledStatement::text_only(text))
}

fn render_column_definition(column: &FreeColumn) -> JsqlResult<String> {
    let mut rendered = format!(
        "{} {}",
        escape_identifier(&column.name)?,
        column.settings.data_type.ddl_type()
    );
    if let Some(default) = &column.settings.default_value {
        if !default.is_null() {
            rendered.push_str(" DEFAULT ");
            rendered.push_str(&render_default(&column.name, column.settings.data_type, default)?);
        }
    }
    Ok(rendered)
}

fn render_default(column: &str, data_type: DataType, value: &Value) -> JsqlResult<String> {
    match (data_type, value) {
        (DataType::Text, v) => escape_literal(v),
        (DataType::Number, Value::Number(n)) => Ok(n.to_string()),
        (DataType::Boolean, Value::Bool(true)) => Ok("TRUE".to_string()),
        (DataType::Boolean, Value::Bool(false)) => Ok("FALSE".to_string()),
        (_, v) => Err(JsqlError::DefaultTypeMismatch {
            column: column.to_string(),
            data_type: data_type.to_string(),
            value: v.to_string(),
        }),
    }
}

fn compile_drop(drop: &DropStatement) -> JsqlResult<CompiledStatement> {
    let (keyword, name) = match &drop.target {
        Entity::Table(t) => (ObjectKeyword::Table, t.name()),
        Entity::Role(r) => (ObjectKeyword::Role, r.name()),
    };
    let if_exists = if drop.if_exists { " IF EXISTS" } else { "" };
    Ok(CompiledStatement::text_only(format!(
        "DROP {}{} {}",
        keyword.as_str(),
        if_exists,
        escape_identifier(name)?
    )))
}

fn compile_insert(insert: &InsertStatement) -> JsqlResult<CompiledStatement> {
    let table: &Table = &insert.into;
    if insert.values.is_empty() {
        return Err(JsqlError::EmptyInsert(table.name().to_string()));
    }

    let mut columns = Vec::with_capacity(insert.values.len());
    let mut placeholders = Vec::with_capacity(insert.values.len());
    let mut parameters = Vec::with_capacity(insert.values.len());

    for (key, value) in &insert.values {
        if !table.has_column(key) {
            return Err(JsqlError::unknown_column(table.name(), key.as_str()));
        }
        columns.push(escape_identifier(key)?);
        parameters.push(value.clone());
        placeholders.push(format!("${}", parameters.len()));
    }

    Ok(CompiledStatement {
        text: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            escape_identifier(table.name())?,
            columns.join(", "),
            placeholders.join(", ")
        ),
        parameters,
    })
}

fn compile_grant(grant: &GrantStatement) -> JsqlResult<CompiledStatement> {
    let privilege = Privilege::parse(&grant.privilege)?;
    Ok(CompiledStatement::text_only(format!(
        "GRANT {} ON {} TO {}",
        privilege,
        escape_identifier(grant.on.name())?,
        escape_identifier(grant.to.name())?
    )))
}

fn compile_revoke(revoke: &RevokeStatement) -> JsqlResult<CompiledStatement> {
    let privilege = Privilege::parse(&revoke.privilege)?;
    Ok(CompiledStatement::text_only(format!(
        "REVOKE {} ON {} FROM {}",
        privilege,
        escape_identifier(revoke.on.name())?,
        escape_identifier(revoke.from.name())?
    )))
}

/// Parameters follow the function's declaration order, not the order of
/// the supplied arguments. Absent arguments become `NULL`.
fn compile_execute(execute: &ExecuteStatement) -> JsqlResult<CompiledStatement> {
    let declared = execute.function.parameters();
    let parameters: Vec<Value> = declared
        .iter()
        .map(|p| execute.args.get(&p.name).cloned().unwrap_or(Value::Null))
        .collect();
    let placeholders: Vec<String> = (1..=parameters.len()).map(|n| format!("${}", n)).collect();

    Ok(CompiledStatement {
        text: format!(
            "SELECT {}({})",
            escape_identifier(execute.function.name())?,
            placeholders.join(", ")
        ),
        parameters,
    })
}

//! Error types for statement construction, validation and compilation.

use thiserror::Error;

/// Result type used throughout the JSQL crate.
pub type JsqlResult<T> = Result<T, JsqlError>;

/// Errors raised while escaping, building or compiling a statement.
///
/// None of these ever reach the database: they are raised synchronously to
/// the caller of the builder or the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsqlError {
    /// Identifier contains a forbidden character (`' " & $ % ;`) or is empty.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// A literal was requested for a value that is not a string.
    #[error("invalid literal {0}: only strings can be escaped as literals")]
    InvalidLiteral(String),

    /// `select(..)` was compiled without a `from(..)` table.
    #[error("select statement has no FROM table")]
    MissingFrom,

    /// `insert(..)` was given an empty value mapping.
    #[error("insert into {0:?} has no values")]
    EmptyInsert(String),

    /// A column name is not part of the target table.
    #[error("column {column:?} does not exist in table {table:?}")]
    UnknownColumn { table: String, column: String },

    /// A column that is neither nullable nor defaultable was not supplied.
    #[error("insert into {table:?} is missing required column {column:?}")]
    MissingRequiredColumn { table: String, column: String },

    /// Privilege is not one of SELECT / INSERT.
    #[error("unknown privilege {0:?}, expected SELECT or INSERT")]
    UnknownPrivilege(String),

    /// Two columns (or function parameters) share a name.
    #[error("duplicate column {column:?} in {owner:?}")]
    DuplicateColumn { owner: String, column: String },

    /// Column default value does not agree with its data type.
    #[error("default value {value} of column {column:?} is not of type {data_type}")]
    DefaultTypeMismatch {
        column: String,
        data_type: String,
        value: String,
    },

    /// A value (insert value or call argument) does not agree with its column type.
    #[error("value {value} for {column:?} is not of type {data_type}")]
    TypeMismatch {
        column: String,
        data_type: String,
        value: String,
    },

    /// A call argument names no parameter of the function.
    #[error("function {function:?} has no parameter {argument:?}")]
    UnknownArgument { function: String, argument: String },

    /// A parameter that is neither nullable nor defaultable was not supplied.
    #[error("call to {function:?} is missing required argument {argument:?}")]
    MissingRequiredArgument { function: String, argument: String },
}

impl JsqlError {
    pub(crate) fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

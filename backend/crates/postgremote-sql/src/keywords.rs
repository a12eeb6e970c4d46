//! SQL keyword enumerations used by the compiler.

use crate::error::JsqlError;
use std::fmt;
use std::str::FromStr;

/// Privileges that can be granted on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    Select,
    Insert,
}

impl Privilege {
    pub fn as_str(self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
        }
    }

    /// Case-insensitive parse, `UnknownPrivilege` for anything else.
    pub fn parse(s: &str) -> Result<Self, JsqlError> {
        s.parse()
    }
}

impl FromStr for Privilege {
    type Err = JsqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "select" => Ok(Privilege::Select),
            "insert" => Ok(Privilege::Insert),
            _ => Err(JsqlError::UnknownPrivilege(s.to_string())),
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of object a CREATE / DROP statement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKeyword {
    Table,
    Role,
}

impl ObjectKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKeyword::Table => "TABLE",
            ObjectKeyword::Role => "ROLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_parse_is_case_insensitive() {
        assert_eq!(Privilege::parse("select").unwrap(), Privilege::Select);
        assert_eq!(Privilege::parse("SeLeCt").unwrap(), Privilege::Select);
        assert_eq!(Privilege::parse("INSERT").unwrap(), Privilege::Insert);
    }

    #[test]
    fn test_privilege_parse_rejects_others() {
        for bad in ["update", "delete", "all", "", "select;"] {
            assert!(matches!(Privilege::parse(bad), Err(JsqlError::UnknownPrivilege(_))));
        }
    }
}

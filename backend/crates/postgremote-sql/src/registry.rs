//! Startup-defined entities.
//!
//! The registry is filled once when the process starts and is read-only
//! afterwards; share it behind an `Arc`.

use crate::models::{Function, Role, Table};
use crate::statement::{ExecuteStatement, Statement};
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {name:?} is already registered")]
pub struct DuplicateEntity {
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    tables: HashMap<String, Table>,
    roles: HashMap<String, Role>,
    functions: HashMap<String, Function>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(
        tables: impl IntoIterator<Item = Table>,
        roles: impl IntoIterator<Item = Role>,
        functions: impl IntoIterator<Item = Function>,
    ) -> Result<Self, DuplicateEntity> {
        let mut registry = Self::new();
        for table in tables {
            registry.register_table(table)?;
        }
        for role in roles {
            registry.register_role(role)?;
        }
        for function in functions {
            registry.register_function(function)?;
        }
        Ok(registry)
    }

    pub fn register_table(&mut self, table: Table) -> Result<(), DuplicateEntity> {
        if self.tables.contains_key(table.name()) {
            return Err(DuplicateEntity {
                kind: "table",
                name: table.name().to_string(),
            });
        }
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    pub fn register_role(&mut self, role: Role) -> Result<(), DuplicateEntity> {
        if self.roles.contains_key(role.name()) {
            return Err(DuplicateEntity {
                kind: "role",
                name: role.name().to_string(),
            });
        }
        self.roles.insert(role.name().to_string(), role);
        Ok(())
    }

    pub fn register_function(&mut self, function: Function) -> Result<(), DuplicateEntity> {
        if self.functions.contains_key(function.name()) {
            return Err(DuplicateEntity {
                kind: "function",
                name: function.name().to_string(),
            });
        }
        self.functions.insert(function.name().to_string(), function);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Swap a client-supplied function descriptor for the registered one.
    ///
    /// Registered functions keep their declared parameters and token flag.
    /// Unregistered functions still run, but can never be token-producing:
    /// their `marks_token_result` flag is cleared.
    pub fn resolve(&self, statement: Statement) -> Statement {
        match statement {
            Statement::Execute(exec) => Statement::Execute(self.resolve_execute(exec)),
            other => other,
        }
    }

    fn resolve_execute(&self, exec: ExecuteStatement) -> ExecuteStatement {
        if let Some(registered) = self.functions.get(exec.function.name()) {
            return ExecuteStatement {
                function: registered.clone(),
                args: exec.args,
            };
        }

        if exec.function.marks_token_result() {
            debug!(
                "Ignoring token flag on unregistered function {:?}",
                exec.function.name()
            );
        }

        ExecuteStatement {
            function: exec.function.without_token_flag(),
            args: exec.args,
        }
    }
}

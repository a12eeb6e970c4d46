//! Role descriptor: a native database principal.

use crate::error::{JsqlError, JsqlResult};
use crate::escape::escape_identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RoleDefinition", into = "RoleDefinition")]
pub struct Role {
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
}

impl Role {
    pub fn define(name: impl Into<String>) -> JsqlResult<Self> {
        let name = name.into();
        escape_identifier(&name)?;
        Ok(Self { name })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<RoleDefinition> for Role {
    type Error = JsqlError;

    fn try_from(def: RoleDefinition) -> Result<Self, Self::Error> {
        Role::define(def.name)
    }
}

impl From<Role> for RoleDefinition {
    fn from(role: Role) -> Self {
        RoleDefinition { name: role.name }
    }
}

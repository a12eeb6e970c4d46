//! Stored function descriptor.

use super::column::FreeColumn;
use crate::builder::ExecuteGenerator;
use crate::error::{JsqlError, JsqlResult};
use crate::escape::escape_identifier;
use crate::ValueMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Wire/config form of a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<FreeColumn>,
    #[serde(default, alias = "marks_token_result")]
    pub marks_token_result: bool,
}

/// A stored function.
///
/// Parameters reuse the free-column shape so call arguments get the same
/// nullable/defaultable semantics as insert values. When
/// `marks_token_result` is set, the single value the function returns is an
/// opaque credential payload and is never handed back to the caller as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FunctionDefinition", into = "FunctionDefinition")]
pub struct Function {
    name: String,
    parameters: Vec<FreeColumn>,
    marks_token_result: bool,
}

impl Function {
    pub fn define(
        name: impl Into<String>,
        parameters: Vec<FreeColumn>,
        marks_token_result: bool,
    ) -> JsqlResult<Self> {
        let name = name.into();
        escape_identifier(&name)?;

        let mut seen = HashSet::with_capacity(parameters.len());
        for param in &parameters {
            param.validate()?;
            if !seen.insert(param.name.as_str()) {
                return Err(JsqlError::DuplicateColumn {
                    owner: name,
                    column: param.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            parameters,
            marks_token_result,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order.
    #[inline]
    pub fn parameters(&self) -> &[FreeColumn] {
        &self.parameters
    }

    #[inline]
    pub fn marks_token_result(&self) -> bool {
        self.marks_token_result
    }

    pub(crate) fn without_token_flag(mut self) -> Self {
        self.marks_token_result = false;
        self
    }

    /// Build an `Execute` statement generator. Nothing runs yet.
    ///
    /// Arguments may be given in any order and any subset; missing ones
    /// compile to `NULL`.
    pub fn call<I, K, V>(&self, args: I) -> ExecuteGenerator
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let args: ValueMap = args.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        ExecuteGenerator::new(self.clone(), args)
    }

    /// Like [`Function::call`], but checks the arguments first.
    ///
    /// # Errors
    /// - `UnknownArgument` for an argument naming no parameter
    /// - `MissingRequiredArgument` for an absent required parameter
    /// - `TypeMismatch` for a value of the wrong type
    pub fn call_checked<I, K, V>(&self, args: I) -> JsqlResult<ExecuteGenerator>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let generator = self.call(args);
        self.check_args(generator.args())?;
        Ok(generator)
    }

    pub fn check_args(&self, args: &ValueMap) -> JsqlResult<()> {
        for key in args.keys() {
            if !self.parameters.iter().any(|p| &p.name == key) {
                return Err(JsqlError::UnknownArgument {
                    function: self.name.clone(),
                    argument: key.clone(),
                });
            }
        }

        for param in &self.parameters {
            match args.get(&param.name) {
                Some(value) => param.settings.check_value(&param.name, value)?,
                None if param.settings.is_required() => {
                    return Err(JsqlError::MissingRequiredArgument {
                        function: self.name.clone(),
                        argument: param.name.clone(),
                    })
                },
                None => {},
            }
        }

        Ok(())
    }
}

impl TryFrom<FunctionDefinition> for Function {
    type Error = JsqlError;

    fn try_from(def: FunctionDefinition) -> Result<Self, Self::Error> {
        Function::define(def.name, def.parameters, def.marks_token_result)
    }
}

impl From<Function> for FunctionDefinition {
    fn from(function: Function) -> Self {
        FunctionDefinition {
            name: function.name,
            parameters: function.parameters,
            marks_token_result: function.marks_token_result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::column::ColumnSettings;
    use serde_json::json;

    fn one_arg_required_two_optional() -> Function {
        Function::define(
            "oneArg",
            vec![
                FreeColumn::define("arg", ColumnSettings::text()).unwrap(),
                FreeColumn::define("nullable", ColumnSettings::number().nullable()).unwrap(),
                FreeColumn::define("defaultable", ColumnSettings::boolean().defaultable())
                    .unwrap(),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_call_checked_requires_required_args() {
        let f = one_arg_required_two_optional();
        let err = f.call_checked(Vec::<(String, Value)>::new()).unwrap_err();
        assert!(matches!(err, JsqlError::MissingRequiredArgument { .. }));
        assert!(f.call_checked([("arg", "string")]).is_ok());
    }

    #[test]
    fn test_call_checked_type_mismatch() {
        let f = one_arg_required_two_optional();
        assert!(matches!(
            f.call_checked([("arg", json!(1))]),
            Err(JsqlError::TypeMismatch { .. })
        ));
        assert!(matches!(
            f.call_checked([("arg", json!("")), ("defaultable", json!("no"))]),
            Err(JsqlError::TypeMismatch { .. })
        ));
        assert!(matches!(
            f.call_checked([("arg", json!("")), ("nullable", json!("no"))]),
            Err(JsqlError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_call_checked_unknown_argument() {
        let f = one_arg_required_two_optional();
        assert!(matches!(
            f.call_checked([("arg", json!("a")), ("bogus", json!(1))]),
            Err(JsqlError::UnknownArgument { .. })
        ));
    }

    #[test]
    fn test_duplicate_parameters_rejected() {
        let err = Function::define(
            "f",
            vec![
                FreeColumn::define("a", ColumnSettings::text()).unwrap(),
                FreeColumn::define("a", ColumnSettings::text()).unwrap(),
            ],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, JsqlError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_wire_shape() {
        let f: Function = serde_json::from_value(json!({
            "name": "login",
            "parameters": [{"name": "username"}, {"name": "password"}],
            "marksTokenResult": true
        }))
        .unwrap();
        assert_eq!(f.name(), "login");
        assert_eq!(f.parameters().len(), 2);
        assert!(f.marks_token_result());
    }
}

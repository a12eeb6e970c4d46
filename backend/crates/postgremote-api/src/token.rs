//! Subject extraction from a token-producing function's result.

use crate::error::{GatewayError, GatewayResult};
use crate::pool::QueryOutput;
use serde_json::Value;

/// Pull the credential subject out of the first value of `output`.
///
/// When `expected_type` is set, the result column must have that database
/// type.
pub fn subject_from_output(output: &QueryOutput, expected_type: Option<&str>) -> GatewayResult<String> {
    let (column, value) = output
        .first_value()
        .ok_or_else(|| GatewayError::TokenPayload("function returned no rows".to_string()))?;

    if let Some(expected) = expected_type {
        if !column.type_name.eq_ignore_ascii_case(expected) {
            return Err(GatewayError::TokenPayload(format!(
                "column {:?} has type {}, expected {}",
                column.name, column.type_name, expected
            )));
        }
    }

    parse_payload(value)
        .ok_or_else(|| GatewayError::TokenPayload(format!("unusable value {}", value)))
}

/// - `"(subject,...)"`: first field of a composite in text form
/// - any other non-empty string: the subject itself
/// - an object (a decoded composite): its `role`, else its `sub`, else its
///   first field
pub fn parse_payload(value: &Value) -> Option<String> {
    let subject = match value {
        Value::String(s) if s.starts_with('(') && s.ends_with(')') => first_composite_field(s)?,
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("role")
            .or_else(|| map.get("sub"))
            .or_else(|| map.values().next())
            .and_then(Value::as_str)?
            .to_string(),
        _ => return None,
    };

    if subject.is_empty() {
        None
    } else {
        Some(subject)
    }
}

/// First field of `(a,b,...)`. Quoted fields may contain `""` and
/// backslash escapes; an empty unquoted field is NULL.
fn first_composite_field(text: &str) -> Option<String> {
    let inner = &text[1..text.len() - 1];
    let mut chars = inner.chars().peekable();

    if chars.peek() != Some(&'"') {
        let field: String = chars.take_while(|c| *c != ',').collect();
        return if field.is_empty() { None } else { Some(field) };
    }

    chars.next();
    let mut field = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            },
            '"' => return Some(field),
            '\\' => field.push(chars.next()?),
            c => field.push(c),
        }
    }
    None
}

//! Identifier and literal escaping.
//!
//! These are the only functions allowed to turn user-controlled names and
//! values into SQL text. The compiler never concatenates a raw identifier.

use crate::error::{JsqlError, JsqlResult};
use serde_json::Value;

/// Characters that are never accepted inside an identifier.
pub const FORBIDDEN_IDENTIFIER_CHARS: [char; 6] = ['\'', '"', '&', '$', '%', ';'];

/// Double-quote an identifier.
///
/// Dotted names are split and every segment is quoted on its own, so
/// `table.column` becomes `"table"."column"`.
///
/// # Errors
/// `InvalidIdentifier` when the name is empty, has an empty segment, or
/// contains one of [`FORBIDDEN_IDENTIFIER_CHARS`].
pub fn escape_identifier(name: &str) -> JsqlResult<String> {
    if name.is_empty() || name.contains(FORBIDDEN_IDENTIFIER_CHARS) {
        return Err(JsqlError::InvalidIdentifier(name.to_string()));
    }

    let mut quoted = Vec::new();
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err(JsqlError::InvalidIdentifier(name.to_string()));
        }
        quoted.push(format!("\"{}\"", segment));
    }

    Ok(quoted.join("."))
}

/// Escape a JSON value as a Postgres `E'...'` string literal.
///
/// # Errors
/// `InvalidLiteral` for anything that is not a JSON string.
pub fn escape_literal(value: &Value) -> JsqlResult<String> {
    match value {
        Value::String(s) => Ok(escape_str_literal(s)),
        other => Err(JsqlError::InvalidLiteral(other.to_string())),
    }
}

/// Escape a string as a C-style `E'...'` literal.
///
/// `$` is backslash-escaped too so the result can never open a
/// dollar-quoted string.
pub fn escape_str_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("E'");
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            },
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

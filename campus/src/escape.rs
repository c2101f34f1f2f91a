//! SQL identifier and literal escaping.
//!
//! These functions produce text that can be inlined into a statement when
//! server-side parameter binding is unavailable. Every value kind either has
//! a safe literal form or is rejected with [`EscapeError::UnsupportedValueKind`];
//! nothing is ever emitted unescaped.

use chrono::{NaiveDateTime, Timelike};

use crate::charset::Charset;
use crate::error::EscapeError;
use crate::value::SqlValue;

/// Connection settings that influence how literals are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionContext {
    /// Character set of the connection.
    pub charset: Charset,
    /// Wrap expanded lists in parentheses.
    pub array_parenthesis: bool,
}

impl ConnectionContext {
    /// Create a context for the given charset.
    pub fn new(charset: Charset) -> Self {
        Self {
            charset,
            array_parenthesis: false,
        }
    }

    /// Set whether lists are wrapped in parentheses.
    pub fn with_array_parenthesis(mut self, enabled: bool) -> Self {
        self.array_parenthesis = enabled;
        self
    }
}

/// Quote an identifier with backticks, doubling any backtick inside it.
///
/// The result is not meant to be escaped again: every call doubles
/// backticks anew.
///
/// # Example
///
/// ```
/// use campus::escape::escape_identifier;
///
/// assert_eq!(escape_identifier("bla").unwrap(), "`bla`");
/// assert_eq!(escape_identifier("`bla`").unwrap(), "```bla```");
/// ```
pub fn escape_identifier(name: &str) -> Result<String, EscapeError> {
    if name.is_empty() {
        return Err(EscapeError::EmptyIdentifier);
    }
    if name.contains('\0') {
        return Err(EscapeError::NulInIdentifier {
            name: name.to_string(),
        });
    }

    let mut out = String::with_capacity(name.len() + 2);
    out.push('`');
    for c in name.chars() {
        if c == '`' {
            out.push('`');
        }
        out.push(c);
    }
    out.push('`');
    Ok(out)
}

/// Render `value` as an SQL literal for the given connection.
///
/// # Example
///
/// ```
/// use campus::charset::Charset;
/// use campus::escape::{escape_value, ConnectionContext};
/// use campus::value::SqlValue;
///
/// let ctx = ConnectionContext::new(Charset::Big5);
/// let literal = escape_value(&ctx, &SqlValue::Bytes(b"test".to_vec())).unwrap();
/// assert_eq!(literal, "_binary'test'");
/// ```
pub fn escape_value(ctx: &ConnectionContext, value: &SqlValue) -> Result<String, EscapeError> {
    match value {
        SqlValue::Null => Ok("NULL".to_string()),
        SqlValue::Bool(b) => Ok(bool_literal(*b).to_string()),
        SqlValue::Int(n) => Ok(n.to_string()),
        SqlValue::UInt(n) => Ok(n.to_string()),
        SqlValue::Float(f) => float_literal(*f),
        SqlValue::Text(s) => Ok(quote(s)),
        SqlValue::Bytes(bytes) => Ok(bytes_literal(ctx.charset, bytes)),
        SqlValue::Date(d) => Ok(format!("'{}'", d.format("%Y-%m-%d"))),
        SqlValue::DateTime(dt) => Ok(datetime_literal(dt)),
        SqlValue::List(items) => {
            let parts = items
                .iter()
                .map(|item| escape_value(ctx, item))
                .collect::<Result<Vec<_>, _>>()?;
            let joined = parts.join(",");
            Ok(if ctx.array_parenthesis {
                format!("({})", joined)
            } else {
                joined
            })
        }
        SqlValue::Json(json) => json_literal(json),
    }
}

/// Backslash-escape the characters MySQL treats specially inside a quoted
/// literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    push_escaped(&mut out, s);
    out
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    push_escaped(&mut out, s);
    out.push('\'');
    out
}

fn bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

fn float_literal(f: f64) -> Result<String, EscapeError> {
    if f.is_finite() {
        Ok(f.to_string())
    } else {
        Err(EscapeError::UnsupportedValueKind {
            kind: "non-finite float",
        })
    }
}

// Binary payloads stay readable when they are valid UTF-8 and cannot collide
// with the escape character; otherwise they go out as a hex literal.
fn bytes_literal(charset: Charset, bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if charset.is_escape_safe() || text.is_ascii() => {
            let mut out = String::with_capacity(bytes.len() + 10);
            out.push_str("_binary'");
            push_escaped(&mut out, text);
            out.push('\'');
            out
        }
        _ => format!("X'{}'", hex::encode_upper(bytes)),
    }
}

// chrono keeps a leap second as `nanosecond() >= 1_000_000_000` and prints
// it as second 60; MySQL has no such second, so it folds into :59.
fn datetime_literal(dt: &NaiveDateTime) -> String {
    let seconds = format!(
        "{} {:02}:{:02}:{:02}",
        dt.format("%Y-%m-%d"),
        dt.hour(),
        dt.minute(),
        dt.second()
    );
    let micros = dt.nanosecond() % 1_000_000_000 / 1_000;
    if micros == 0 {
        format!("'{}'", seconds)
    } else {
        format!("'{}.{:06}'", seconds, micros)
    }
}

fn json_literal(json: &serde_json::Value) -> Result<String, EscapeError> {
    use serde_json::Value;

    match json {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(bool_literal(*b).to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(quote(s)),
        Value::Array(_) | Value::Object(_) => Ok(quote(&json.to_string())),
    }
}

//! Client-side placeholder substitution.
//!
//! `?` is replaced by an escaped value and `??` by an escaped identifier.
//! Question marks inside quoted strings, quoted identifiers and comments are
//! left alone.

use crate::error::EscapeError;
use crate::escape::{escape_identifier, escape_value, ConnectionContext};
use crate::value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexer {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Substitute `params` into the placeholders of `sql`.
///
/// # Errors
///
/// - [`EscapeError::MissingParameter`] when there are more placeholders than values
/// - [`EscapeError::UnusedParameters`] when there are more values than placeholders
/// - any error from escaping an individual value or identifier
///
/// # Example
///
/// ```
/// use campus::escape::ConnectionContext;
/// use campus::query::format_query;
///
/// let sql = format_query(
///     &ConnectionContext::default(),
///     "SELECT * FROM ?? WHERE name = ?",
///     &["schools".into(), "O'Neil".into()],
/// )
/// .unwrap();
/// assert_eq!(sql, "SELECT * FROM `schools` WHERE name = 'O\\'Neil'");
/// ```
pub fn format_query(
    ctx: &ConnectionContext,
    sql: &str,
    params: &[SqlValue],
) -> Result<String, EscapeError> {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut used = 0;
    let mut state = Lexer::Code;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        i += 1;

        match state {
            Lexer::Code => match c {
                '\'' | '"' | '`' => {
                    out.push(c);
                    state = Lexer::Quoted(c);
                }
                '#' => {
                    out.push(c);
                    state = Lexer::LineComment;
                }
                '-' if next == Some('-')
                    && chars.get(i + 1).map_or(true, |c| c.is_whitespace()) =>
                {
                    out.push_str("--");
                    i += 1;
                    state = Lexer::LineComment;
                }
                '/' if next == Some('*') => {
                    out.push_str("/*");
                    i += 1;
                    state = Lexer::BlockComment;
                }
                '?' => {
                    let value = params
                        .get(used)
                        .ok_or(EscapeError::MissingParameter { index: used })?;
                    used += 1;
                    if next == Some('?') {
                        i += 1;
                        out.push_str(&identifier_param(value)?);
                    } else {
                        out.push_str(&escape_value(ctx, value)?);
                    }
                }
                _ => out.push(c),
            },
            Lexer::Quoted(quote) => {
                out.push(c);
                if c == '\\' && quote != '`' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 1;
                    }
                } else if c == quote {
                    state = Lexer::Code;
                }
            }
            Lexer::LineComment => {
                out.push(c);
                if c == '\n' {
                    state = Lexer::Code;
                }
            }
            Lexer::BlockComment => {
                out.push(c);
                if c == '*' && next == Some('/') {
                    out.push('/');
                    i += 1;
                    state = Lexer::Code;
                }
            }
        }
    }

    if used < params.len() {
        return Err(EscapeError::UnusedParameters {
            expected: used,
            given: params.len(),
        });
    }

    Ok(out)
}

fn identifier_param(value: &SqlValue) -> Result<String, EscapeError> {
    match value {
        SqlValue::Text(name) => escape_identifier(name),
        SqlValue::Json(serde_json::Value::String(name)) => escape_identifier(name),
        SqlValue::List(names) => {
            let parts = names
                .iter()
                .map(identifier_param)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(", "))
        }
        other => Err(EscapeError::UnsupportedValueKind { kind: other.kind() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(sql: &str, params: &[SqlValue]) -> Result<String, EscapeError> {
        format_query(&ConnectionContext::default(), sql, params)
    }

    #[test]
    fn test_insert_statement() {
        let sql = format(
            "INSERT INTO schools (name, address, latitude, longitude) VALUES (?, ?, ?, ?)",
            &["St. Mary's".into(), "1 Main St".into(), 12.97.into(), 77.59.into()],
        )
        .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO schools (name, address, latitude, longitude) \
             VALUES ('St. Mary\\'s', '1 Main St', 12.97, 77.59)"
        );
    }

    #[test]
    fn test_identifier_placeholder() {
        assert_eq!(
            format("SELECT ?? FROM ??", &[
                SqlValue::List(vec!["id".into(), "name".into()]),
                "schools".into()
            ])
            .unwrap(),
            "SELECT `id`, `name` FROM `schools`"
        );
        assert_eq!(
            format("SELECT * FROM ??", &[SqlValue::Int(1)]),
            Err(EscapeError::UnsupportedValueKind { kind: "int" })
        );
    }

    #[test]
    fn test_placeholders_in_quotes_are_kept() {
        assert_eq!(
            format("SELECT '?', \"?\", `?`, 'it\\'s ?', ?", &[1.into()]).unwrap(),
            "SELECT '?', \"?\", `?`, 'it\\'s ?', 1"
        );
        assert_eq!(
            format("SELECT 'a''?' , ?", &[2.into()]).unwrap(),
            "SELECT 'a''?' , 2"
        );
    }

    #[test]
    fn test_placeholders_in_comments_are_kept() {
        assert_eq!(
            format("SELECT ? -- why?\n, ? # what?\n/* ? */ , ?", &[
                1.into(),
                2.into(),
                3.into()
            ])
            .unwrap(),
            "SELECT 1 -- why?\n, 2 # what?\n/* ? */ , 3"
        );
        // `--` without trailing whitespace is two minus signs
        assert_eq!(format("SELECT 5--?", &[1.into()]).unwrap(), "SELECT 5--1");
    }

    #[test]
    fn test_parameter_count_mismatch() {
        assert_eq!(
            format("SELECT ?, ?", &[1.into()]),
            Err(EscapeError::MissingParameter { index: 1 })
        );
        assert_eq!(
            format("SELECT ?", &[1.into(), 2.into()]),
            Err(EscapeError::UnusedParameters {
                expected: 1,
                given: 2
            })
        );
        assert_eq!(format("SELECT 1", &[]).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        assert_eq!(
            format("SELECT 'école', ?", &["日本".into()]).unwrap(),
            "SELECT 'école', '日本'"
        );
    }
}

pub mod dump;
pub mod escape;
pub mod format;

use anyhow::{Context, Result};
use campus::{Charset, ConnectionContext, SqlValue};

/// Build a connection context from a charset name.
pub fn connection(charset: &str) -> Result<ConnectionContext> {
    let charset: Charset = charset
        .parse()
        .with_context(|| format!("Invalid --charset value '{}'", charset))?;
    Ok(ConnectionContext::new(charset))
}

/// Interpret a command-line argument as JSON, falling back to plain text.
pub fn parse_param(raw: &str) -> SqlValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => SqlValue::Json(json),
        Err(_) => SqlValue::Text(raw.to_string()),
    }
}

/// Decode bytes given as hex, ignoring whitespace (`"0a 00 00 00"`).
pub fn decode_hex(raw: &str) -> Result<Vec<u8>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).with_context(|| format!("Invalid hex '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("42"), SqlValue::Json(json!(42)));
        assert_eq!(parse_param("null"), SqlValue::Json(json!(null)));
        assert_eq!(parse_param("\"quoted\""), SqlValue::Json(json!("quoted")));
        assert_eq!(parse_param("plain words"), SqlValue::Text("plain words".to_string()));
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0a000001").unwrap(), vec![0x0a, 0, 0, 1]);
        assert_eq!(decode_hex("AA BB cc").unwrap(), vec![0xaa, 0xbb, 0xcc]);
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn test_connection() {
        assert_eq!(connection("big5").unwrap().charset, Charset::Big5);
        assert!(connection("nope").is_err());
    }
}

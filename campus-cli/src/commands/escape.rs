use anyhow::{Context, Result};
use campus::{escape_identifier, escape_value, SqlValue};
use serde::Serialize;

use super::{connection, decode_hex, parse_param};

/// How the `escape` argument is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    Text,
    Json,
    /// UTF-8 bytes of the argument.
    Binary,
    /// Bytes given as hex, so payloads that are not valid UTF-8 can be passed.
    BinaryHex,
}

#[derive(Serialize)]
struct Escaped {
    input: String,
    output: String,
}

pub fn run_identifiers(names: Vec<String>, json: bool) -> Result<()> {
    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let output = escape_identifier(&name)
            .with_context(|| format!("Cannot escape identifier {:?}", name))?;
        results.push(Escaped {
            input: name,
            output,
        });
    }

    if json {
        println!("{}", serde_json::to_string(&results)?);
    } else {
        for result in results {
            println!("{}", result.output);
        }
    }

    Ok(())
}

pub fn run_value(charset: &str, value: String, mode: ValueMode, json: bool) -> Result<()> {
    let ctx = connection(charset)?;
    let sql_value = to_sql_value(&value, mode)?;
    let output = escape_value(&ctx, &sql_value).context("Failed to escape value")?;

    if json {
        let escaped = Escaped {
            input: value,
            output,
        };
        println!("{}", serde_json::to_string(&escaped)?);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn to_sql_value(value: &str, mode: ValueMode) -> Result<SqlValue> {
    Ok(match mode {
        ValueMode::Text => SqlValue::Text(value.to_string()),
        ValueMode::Json => match parse_param(value) {
            SqlValue::Text(_) => anyhow::bail!("Value is not valid JSON: {}", value),
            parsed => parsed,
        },
        ValueMode::Binary => SqlValue::Bytes(value.as_bytes().to_vec()),
        ValueMode::BinaryHex => SqlValue::Bytes(decode_hex(value).context("Invalid --binary-hex")?),
    })
}

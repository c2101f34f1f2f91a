use anyhow::{Context, Result};
use campus::format_query;
use serde::Serialize;

use super::{connection, parse_param};

#[derive(Serialize)]
struct Formatted<'a> {
    sql: &'a str,
    statement: String,
}

pub fn run(charset: &str, sql: &str, params: Vec<String>, json: bool) -> Result<()> {
    let ctx = connection(charset)?;
    let values: Vec<_> = params.iter().map(|p| parse_param(p)).collect();

    let statement = format_query(&ctx, sql, &values).context("Failed to format query")?;

    if json {
        println!("{}", serde_json::to_string(&Formatted { sql, statement })?);
    } else {
        println!("{}", statement);
    }

    Ok(())
}

use anyhow::{Context, Result};
use campus::{DumpConfig, DumpRequest};
use serde::Serialize;
use std::path::PathBuf;

use super::decode_hex;

#[derive(Serialize)]
struct DumpResponse {
    file: String,
    size: usize,
    dump: String,
}

pub fn run(
    file: PathBuf,
    offset: usize,
    end: Option<usize>,
    header: Option<String>,
    max_len: usize,
    json: bool,
) -> Result<()> {
    let data = std::fs::read(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let header = header
        .map(|h| decode_hex(&h).context("Invalid --header"))
        .transpose()?;

    let mut request = DumpRequest::new(&data).start(offset);
    if let Some(end) = end {
        request = request.end(end);
    }
    if let Some(header) = header.as_deref() {
        request = request.header(header);
    }

    let dump = request.render(&DumpConfig::new(Some(max_len)));

    if json {
        let response = DumpResponse {
            file: file.display().to_string(),
            size: data.len(),
            dump,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else if dump.is_empty() {
        println!("(empty)");
    } else {
        print!("{}", dump);
    }

    Ok(())
}

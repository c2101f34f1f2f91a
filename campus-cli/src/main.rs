use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::escape::ValueMode;

/// Packet dumps and SQL escaping from the command line
#[derive(Parser)]
#[command(name = "campus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection charset used when rendering literals
    #[arg(
        long,
        env = "CAMPUS_CHARSET",
        default_value = "utf8mb4",
        global = true
    )]
    charset: String,

    /// Output results as JSON
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a hex/ASCII dump of a file
    Dump {
        /// File to dump
        file: PathBuf,

        /// First byte to render
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Exclusive end offset (defaults to end of file)
        #[arg(long)]
        end: Option<usize>,

        /// Hex bytes shown before the file contents (e.g. "0a000000")
        #[arg(long)]
        header: Option<String>,

        /// Maximum bytes rendered, 0 for no limit
        #[arg(short, long, env = "CAMPUS_DEBUG_LEN", default_value = "256")]
        max_len: usize,
    },

    /// Quote identifiers with backticks
    EscapeId {
        /// Identifiers to quote
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Render a value as an SQL literal
    Escape {
        /// Value to render (text unless --as-json, --binary or --binary-hex is given)
        value: String,

        /// Parse the value as JSON
        #[arg(long, conflicts_with_all = ["binary", "binary_hex"])]
        as_json: bool,

        /// Treat the value as raw bytes
        #[arg(long, conflicts_with = "binary_hex")]
        binary: bool,

        /// Treat the value as hex-encoded raw bytes (e.g. "a45c27")
        #[arg(long)]
        binary_hex: bool,
    },

    /// Substitute parameters into `?` / `??` placeholders
    Format {
        /// Statement with placeholders
        sql: String,

        /// Parameters, parsed as JSON when possible and as text otherwise
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump {
            file,
            offset,
            end,
            header,
            max_len,
        } => commands::dump::run(file, offset, end, header, max_len, cli.json),
        Commands::EscapeId { names } => commands::escape::run_identifiers(names, cli.json),
        Commands::Escape {
            value,
            as_json,
            binary,
            binary_hex,
        } => {
            let mode = if as_json {
                ValueMode::Json
            } else if binary_hex {
                ValueMode::BinaryHex
            } else if binary {
                ValueMode::Binary
            } else {
                ValueMode::Text
            };
            commands::escape::run_value(&cli.charset, value, mode, cli.json)
        }
        Commands::Format { sql, params } => {
            commands::format::run(&cli.charset, &sql, params, cli.json)
        }
    }
}

//! `twinform` CLI: convert, validate, and compare bracketed and indented text.
//!
//! ## Usage
//!
//! ```sh
//! # Bracketed to indented (stdin → stdout)
//! echo '{"Name":"Ada","Tags":["x","y"]}' | twinform convert --from bracketed --to indented
//!
//! # File to file, using the format aliases
//! twinform convert --from yaml --to json -i person.yaml -o person.json
//!
//! # Check that a file parses
//! twinform check --format indented -i person.yaml
//!
//! # Compare sizes of both renderings
//! twinform stats -i person.json
//!
//! # Debug logging (or set RUST_LOG)
//! twinform -vv check --format bracketed -i person.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;
use twinform_core::Format;

#[derive(Parser)]
#[command(
    name = "twinform",
    version,
    about = "Convert between bracketed and indented structured text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse text in one format and render it in another
    Convert {
        /// Input format: bracketed (json) or indented (yaml)
        #[arg(long)]
        from: Format,
        /// Output format: bracketed (json) or indented (yaml)
        #[arg(long)]
        to: Format,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Parse the input and report whether it is well-formed
    Check {
        /// Format of the input
        #[arg(long)]
        format: Format,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Show the size of the input rendered in both formats
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Format of the input
        #[arg(long, default_value = "bracketed")]
        format: Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            from,
            to,
            input,
            output,
        } => {
            let text = read_input(input.as_deref())?;
            let value = from
                .parse(&text)
                .with_context(|| format!("Failed to parse {from} input"))?;
            tracing::info!(%from, %to, "converting");
            write_output(output.as_deref(), &to.render(&value))?;
        }
        Commands::Check { format, input } => {
            let text = read_input(input.as_deref())?;
            format
                .parse(&text)
                .with_context(|| format!("Invalid {format} input"))?;
            println!("ok");
        }
        Commands::Stats { input, format } => {
            let text = read_input(input.as_deref())?;
            let value = format
                .parse(&text)
                .with_context(|| format!("Failed to parse {format} input"))?;
            let bracketed = Format::Bracketed.render(&value).len();
            let indented = Format::Indented.render(&value).len();
            println!("Input:      {} bytes ({})", text.len(), format);
            println!("Bracketed:  {} bytes", bracketed);
            println!("Indented:   {} bytes", indented);
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

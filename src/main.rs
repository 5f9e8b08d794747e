use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cast_convert::convert_file;

/// Convert a legacy CAST SQLite extraction database to the CAST_JSON tile
/// format the viewer loads.
#[derive(Parser)]
#[command(name = "cast-convert", version)]
struct Cli {
    /// Path to the legacy SQLite .db file
    input: PathBuf,

    /// Output path (defaults to <input-stem>_converted.db next to the input)
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "cast_convert=debug"
    } else {
        "cast_convert=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let result = convert_file(&cli.input, cli.output.as_deref())
        .with_context(|| format!("failed converting {}", cli.input.display()));
    match result {
        Ok(path) => {
            println!("Conversion successful! Output: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Conversion failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

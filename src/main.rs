use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marketcheck::reporter::{to_json, write_text};

#[derive(Parser)]
#[command(
    name = "marketcheck",
    version,
    about = "Validate a Cursor plugin marketplace repository"
)]
struct Cli {
    /// Repository root containing .cursor-plugin/marketplace.json
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for validation results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON document with warnings and errors
    Json,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let report = marketcheck::validate_repository(&cli.root);

    let rendered = match cli.format {
        Format::Text => write_text(&report, &mut io::stdout().lock(), &mut io::stderr().lock())
            .map_err(marketcheck::MarketcheckError::from),
        Format::Json => to_json(&report).map(|json| println!("{json}")),
    };
    if let Err(e) = rendered {
        eprintln!("error: cannot write report: {e}");
        std::process::exit(1);
    }

    std::process::exit(report.exit_code());
}

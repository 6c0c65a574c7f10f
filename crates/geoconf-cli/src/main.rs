#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "geoconf: confidence scoring for geocoder results",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Score, rank, and filter a result batch",
        long_about = "Read a request document ({query, data, meta}) as JSON, attach a \
                      confidence to every result, sort by it, and drop results below the \
                      configured floor.",
        after_help = "EXAMPLES:\n    # Score a request file\n    geoconf score --input request.json\n\n    # Read from stdin, print one line per result\n    cat request.json | geoconf score --format text\n\n    # Use explicit settings\n    geoconf score --config geoconf.toml --input request.json"
    )]
    Score(cmd::score::ScoreArgs),

    #[command(
        about = "Show the effective scoring configuration",
        long_about = "Resolve the settings file (--config, ./geoconf.toml, then the user \
                      config directory) and print the validated configuration as JSON.",
        after_help = "EXAMPLES:\n    # Show the configuration in effect here\n    geoconf config\n\n    # Validate a specific file\n    geoconf config --config custom.json"
    )]
    Config(cmd::config::ConfigArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GEOCONF_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "geoconf=debug,info"
        } else {
            "geoconf=info,warn"
        })
    });

    let format = env::var("GEOCONF_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let working_dir = env::current_dir()?;

    match cli.command {
        Commands::Score(ref args) => cmd::score::run_score(args, &working_dir),
        Commands::Config(ref args) => cmd::config::run_config(args, &working_dir),
    }
}

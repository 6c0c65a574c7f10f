use anyhow::{Context, Result};
use clap::Args;
use geoconf_core::config::resolve_config;
use geoconf_core::{ConfidenceStage, ResultHit, ScoreRequest, StageOutcome};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::output::{OutputMode, render_mode, resolve_output_mode};

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Settings file (TOML, or JSON with a .json extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Request document to read; `-` reads stdin.
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Output format (overrides the FORMAT env var).
    #[arg(long, value_enum)]
    pub format: Option<OutputMode>,
}

pub fn run_score(args: &ScoreArgs, working_dir: &Path) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), working_dir)?;
    let stage = ConfidenceStage::new(config);

    let raw = read_input(&args.input)?;
    let mut request: ScoreRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse request from {}", input_label(&args.input)))?;

    match stage.apply(&mut request) {
        StageOutcome::Scored { kept, dropped } => info!(kept, dropped, "scored batch"),
        StageOutcome::PassThrough => info!("request passed through unscored"),
    }

    let hits = request.data.unwrap_or_default();
    render_mode(resolve_output_mode(args.format), &hits, |hits, w| {
        write_rows(hits, w)
    })
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        return Ok(buf);
    }

    std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
}

fn input_label(input: &str) -> &str {
    if input == "-" { "stdin" } else { input }
}

/// One line per hit: rank, confidence to four decimals, default name.
fn write_rows(hits: &[ResultHit], w: &mut dyn Write) -> io::Result<()> {
    for (rank, hit) in hits.iter().enumerate() {
        let confidence = hit
            .confidence
            .map_or_else(|| "-".to_string(), |c| format!("{c:.4}"));
        writeln!(
            w,
            "{}\t{confidence}\t{}",
            rank + 1,
            hit.default_name().unwrap_or("-")
        )?;
    }
    Ok(())
}

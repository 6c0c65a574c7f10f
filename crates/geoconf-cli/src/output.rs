//! Output mode selection and rendering for CLI commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` flag
//! 2. `FORMAT` env var: `"text"` | `"json"`
//! 3. Default: [`OutputMode::Json`], so the command composes in pipelines.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// The output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Machine-readable JSON.
    Json,
    /// One line per result for humans and shell tools.
    Text,
}

fn resolve_output_mode_inner(format_flag: Option<OutputMode>, format_env: Option<&str>) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    match format_env.map(str::to_lowercase).as_deref() {
        Some("text") => OutputMode::Text,
        _ => OutputMode::Json,
    }
}

/// Resolve the output mode from the flag and the `FORMAT` env var.
pub fn resolve_output_mode(format_flag: Option<OutputMode>) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    resolve_output_mode_inner(format_flag, env_val.as_deref())
}

/// Render `value` to stdout: pretty JSON, or through `text_fn`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_env() {
        assert_eq!(
            resolve_output_mode_inner(Some(OutputMode::Json), Some("text")),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode_inner(Some(OutputMode::Text), None),
            OutputMode::Text
        );
    }

    #[test]
    fn env_is_case_insensitive() {
        assert_eq!(resolve_output_mode_inner(None, Some("TEXT")), OutputMode::Text);
        assert_eq!(resolve_output_mode_inner(None, Some("json")), OutputMode::Json);
    }

    #[test]
    fn unknown_or_missing_env_defaults_to_json() {
        assert_eq!(resolve_output_mode_inner(None, Some("pretty")), OutputMode::Json);
        assert_eq!(resolve_output_mode_inner(None, None), OutputMode::Json);
    }
}

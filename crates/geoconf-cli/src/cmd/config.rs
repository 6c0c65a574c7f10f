use anyhow::Result;
use clap::Args;
use geoconf_core::config::resolve_config;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Settings file (TOML, or JSON with a .json extension).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run_config(args: &ConfigArgs, working_dir: &Path) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), working_dir)?;
    debug!(address_parts = config.address_parts().len(), "resolved config");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &config)?;
    writeln!(out)?;
    Ok(())
}

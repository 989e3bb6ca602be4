//! Write a default configuration file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

/// Run the init-config command.
pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file {} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default()
        .save(path)
        .context("Failed to write config file")?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

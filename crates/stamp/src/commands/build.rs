//! Site build command.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stamp_static::SiteBuilder;

use super::config::{load_config, project_root};

/// Run the build command.
pub fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building site...");

    let file_config = load_config(config_path)?;

    // Unset or non-unicode values publish an empty string.
    let secret = env::var(&file_config.inject.env).unwrap_or_default();

    let root = project_root(config_path);
    let mut config = file_config.into_build_config(root, secret);

    // Flags are relative to the working directory, not the config file.
    if let Some(output) = output {
        config.output_dir = env::current_dir()
            .context("Failed to resolve working directory")?
            .join(output);
    }

    let result = SiteBuilder::new(config).build().context("Build failed")?;

    if !result.copied.is_empty() {
        tracing::info!("Copied {} auxiliary file(s)", result.copied.len());
    }

    tracing::info!(
        "Build complete in {}ms! Output in {}",
        result.duration_ms,
        result.output_dir.display()
    );

    Ok(())
}

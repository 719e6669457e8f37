//! Initialize command - writes a default tickchain.toml.

use std::path::Path;

use anyhow::{Context, Result};
use tickchain_config::{ConfigError, TickchainConfig};

use crate::style::{print_hint, print_labeled, print_spacer, print_success};

pub fn run(path: &str, force: bool) -> Result<()> {
    let project_dir = Path::new(path);

    let config_path = match TickchainConfig::write_default(project_dir, force) {
        Ok(config_path) => config_path,
        Err(ConfigError::AlreadyExists(existing)) => anyhow::bail!(
            "Project already initialized: {} exists. Use --force to overwrite.",
            existing.display()
        ),
        Err(e) => return Err(e).context("Failed to write tickchain.toml"),
    };

    print_success("Initialized tickchain project");
    print_labeled("Config", &config_path.display().to_string());
    print_spacer();
    print_hint(&format!(
        "Run a session with: tickchain run --project {}",
        project_dir.display()
    ));
    print_hint("Put machine-specific overrides in tickchain.local.toml");

    Ok(())
}

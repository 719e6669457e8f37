//! Configuration management commands.

use anyhow::{Context, Result};
use std::path::Path;
use tickchain_config::ConfigLoader;

use crate::style::{print_error, print_success};

/// Show the effective configuration.
pub fn show(project: &str, format: &str) -> Result<()> {
    let project_path = Path::new(project);

    let config = ConfigLoader::new()
        .with_project_dir(project_path)
        .load()
        .context("Failed to load configuration")?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        "toml" => {
            let toml_str = toml::to_string_pretty(&config)?;
            print!("{toml_str}");
        }
        _ => {
            println!("tickchain configuration");
            println!("=======================\n");

            println!("Session:");
            println!("  Manifest id: {}", config.session.manifest_id);
            println!("  Tick: {} ms", config.session.tick_ms);
            println!(
                "  Max ticks: {}",
                if config.session.max_ticks == 0 {
                    "until interrupted".to_string()
                } else {
                    config.session.max_ticks.to_string()
                }
            );
            println!("  Stress: {}", config.session.a_stress);
            println!();

            println!("Kernel:");
            println!("  Decay: {}", config.kernel.decay);
            println!("  Weight: {}", config.kernel.weight);
            println!();

            println!("Export:");
            println!("  Basename: {}", config.export.basename);
            println!("  Directory: {}", config.export.directory.display());
            println!();

            println!("Display:");
            println!("  History length: {}", config.display.history_len);
            println!("  Color: {}", config.display.color);
        }
    }

    Ok(())
}

/// Validate configuration files.
pub fn validate(project: &str) -> Result<()> {
    let project_path = Path::new(project);

    match ConfigLoader::new().with_project_dir(project_path).load() {
        Ok(_) => {
            print_success("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            print_error(&format!("Configuration validation failed: {e:#}"));
            Err(e)
        }
    }
}

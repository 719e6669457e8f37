//! Configuration loader with multi-source merging

use crate::{Paths, TickchainConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "TICKCHAIN".to_string(),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "TICKCHAIN")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/tickchain/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<TickchainConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = TickchainConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/tickchain/config.toml)
        if self.user_config {
            let paths = Paths::new();
            if let Ok(user_config_file) = paths.user_config_file() {
                if user_config_file.exists() {
                    builder = builder.add_source(
                        config::File::from(user_config_file)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // 3. Project config (tickchain.toml)
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(
                config::File::from(project_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 4. Local config (tickchain.local.toml, gitignored)
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(
                config::File::from(local_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (TICKCHAIN_SESSION__TICK_MS=250)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Build and deserialize
        let config = builder.build().context("Failed to build configuration")?;

        let mut tickchain_config: TickchainConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Resolve relative paths
        tickchain_config.resolve_paths(&self.project_dir);

        tickchain_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(tickchain_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader(dir: &Path) -> ConfigLoader {
        ConfigLoader::new()
            .with_project_dir(dir)
            .without_user_config()
            .with_env_prefix("TICKCHAIN_LOADER_TEST")
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path())
            .load()
            .expect("Failed to load config");

        assert_eq!(config.session.tick_ms, 1000.0);
        assert_eq!(config.kernel.decay, 0.995);
        assert_eq!(config.export.basename, "stamps_tickchain_cli");
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        // Write project config
        let config_content = r#"
[session]
manifest_id = "lab-clock"
tick_ms = 250.0
max_ticks = 40

[kernel]
decay = 0.9

[export]
basename = "lab"
"#;
        fs::write(project_dir.join("tickchain.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.session.manifest_id, "lab-clock");
        assert_eq!(config.session.tick_ms, 250.0);
        assert_eq!(config.session.max_ticks, 40);
        assert_eq!(config.kernel.decay, 0.9);
        // Untouched keys keep their defaults
        assert_eq!(config.kernel.weight, 1.0);
        assert_eq!(config.export.basename, "lab");
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("tickchain.toml"),
            r#"
[session]
tick_ms = 500.0
"#,
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("tickchain.local.toml"),
            r#"
[session]
tick_ms = 125.0
"#,
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config should override project config
        assert_eq!(config.session.tick_ms, 125.0);
    }

    #[test]
    fn test_invalid_file_values_fail_to_load() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("tickchain.toml"), "[kernel]\ndecay = 2.0\n")
            .expect("Failed to write config");

        let err = loader(project_dir).load().unwrap_err();
        assert!(format!("{err:#}").contains("kernel.decay"));
    }

    #[test]
    fn test_malformed_toml_fails_to_load() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("tickchain.toml"), "[session\ntick_ms = ")
            .expect("Failed to write config");

        assert!(loader(project_dir).load().is_err());
    }

    // Environment overrides are exercised by the CLI integration tests,
    // which set TICKCHAIN_* on a child process:
    //
    // TICKCHAIN_SESSION__TICK_MS=250
    // TICKCHAIN_KERNEL__DECAY=0.9

    #[test]
    fn test_path_resolution() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config = loader(project_dir).load().expect("Failed to load config");

        // Relative paths should be resolved to absolute
        assert!(config.export.directory.is_absolute());
        assert!(config.export.directory.starts_with(project_dir));
    }
}

//! Configuration management for tickchain
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (`TICKCHAIN_*` prefix, `__` between levels)
//! 3. tickchain.local.toml (gitignored, local overrides)
//! 4. tickchain.toml (git-tracked, project config)
//! 5. ~/.config/tickchain/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tickchain::{
    AlignmentParams, DEFAULT_BASENAME, DEFAULT_TICK_MS, EngineParams, HISTORY_LEN, KernelParams,
    STRESS_LIMIT, SessionConfig,
};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main tickchain configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickchainConfig {
    pub session: SessionSection,
    pub kernel: KernelSection,
    pub export: ExportSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Label shown in the run banner.
    pub manifest_id: String,
    pub tick_ms: f64,
    /// 0 runs until interrupted.
    pub max_ticks: u64,
    pub a_stress: f64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            manifest_id: "tickchain-cli".to_string(),
            tick_ms: DEFAULT_TICK_MS,
            max_ticks: 0,
            a_stress: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSection {
    pub decay: f64,
    pub weight: f64,
}

impl Default for KernelSection {
    fn default() -> Self {
        let params = KernelParams::default();
        Self {
            decay: params.decay,
            weight: params.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub basename: String,
    pub directory: PathBuf,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            basename: DEFAULT_BASENAME.to_string(),
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub history_len: usize,
    pub color: bool,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            history_len: HISTORY_LEN,
            color: true,
        }
    }
}

impl TickchainConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.export.directory.is_relative() {
            self.export.directory = base.join(&self.export.directory);
        }
    }

    /// Rejects values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if !self.session.tick_ms.is_finite() || self.session.tick_ms <= 0.0 {
            return invalid(format!(
                "session.tick_ms must be a positive number, got {}",
                self.session.tick_ms
            ));
        }
        if !self.session.a_stress.is_finite() {
            return invalid("session.a_stress must be finite".to_string());
        }
        if !self.kernel.decay.is_finite() || self.kernel.decay <= 0.0 || self.kernel.decay > 1.0 {
            return invalid(format!(
                "kernel.decay must be in (0, 1], got {}",
                self.kernel.decay
            ));
        }
        if !self.kernel.weight.is_finite() || self.kernel.weight <= 0.0 {
            return invalid(format!(
                "kernel.weight must be positive, got {}",
                self.kernel.weight
            ));
        }
        if self.export.basename.is_empty()
            || self.export.basename.contains(['/', '\\'])
        {
            return invalid(format!(
                "export.basename must be a plain file name prefix, got {:?}",
                self.export.basename
            ));
        }

        Ok(())
    }

    /// Session settings derived from this configuration.
    ///
    /// Stress outside `[-STRESS_LIMIT, STRESS_LIMIT]` is passed through; the
    /// session clamps it and logs the adjustment.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tick_ms: self.session.tick_ms,
            a_stress: self.session.a_stress,
            max_ticks: self.session.max_ticks,
            history_len: self.display.history_len,
            engine: EngineParams {
                alignment: AlignmentParams::default(),
                kernel: KernelParams::new(self.kernel.decay, self.kernel.weight),
            },
        }
    }

    /// Returns true if the configured stress lies outside the accepted range.
    pub fn stress_out_of_range(&self) -> bool {
        self.session.a_stress.abs() > STRESS_LIMIT
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes a default `tickchain.toml` into `project_dir`.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn write_default(project_dir: impl AsRef<Path>, force: bool) -> Result<PathBuf, ConfigError> {
        let project_dir = project_dir.as_ref();
        let path = Paths::project_config_file(project_dir);

        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path));
        }

        let contents = Self::default().to_toml()?;
        fs::create_dir_all(project_dir).map_err(|source| ConfigError::WriteError {
            path: project_dir.to_path_buf(),
            source,
        })?;
        fs::write(&path, contents).map_err(|source| ConfigError::WriteError {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

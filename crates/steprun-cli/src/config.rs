//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STEPRUN_<SECTION>__<KEY>`, e.g.
//!    `STEPRUN_WORKFLOW__DEFAULT_FILE=setup.json`
//! 3. Config file: `--config FILE`, else the platform config path
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "STEPRUN";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where workflows come from and how their commands run.
    pub workflow: WorkflowConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Dynamic placeholder settings.
    pub placeholders: PlaceholderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// File used when `run`/`validate` get no FILE argument.
    pub default_file: PathBuf,
    /// Shell for command actions and placeholders; platform shell if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Register `CURRENT_DATE`, `CURRENT_YEAR`, `TIMESTAMP`, `CURRENT_DIR`.
    pub builtins: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_file: PathBuf::from("steprun.json"),
            shell: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self { builtins: true }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowConfig::default(),
            output: OutputConfig::default(),
            placeholders: PlaceholderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then file, then environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: &Path, required: bool, env: Environment) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to build default configuration")?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(required))
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Configuration has invalid values")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.steprun.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "steprun", "steprun")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".steprun.toml"))
    }
}

//! Layered TOML configuration.
//!
//! Two optional files feed the effective [`Settings`]: the project file
//! (`taskgraph.toml` in the working directory, or the `--config` path) and
//! the user file (`<config_dir>/taskgraph/config.toml`). Project values win
//! over user values; anything unset falls back to the built-in default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROJECT_CONFIG_FILE: &str = "taskgraph.toml";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_OUT_DIR: &str = "data";

/// One config file as written on disk. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub generate: GenerateSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSection {
    pub source: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSection {
    pub seed: Option<u64>,
    pub out_dir: Option<PathBuf>,
}

/// Effective settings after layering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Fallback source vertex when neither the CLI nor the dataset names one.
    pub source: Option<usize>,
    /// Raw `[output] format`; validated during output mode resolution.
    pub format: Option<String>,
    pub seed: u64,
    pub out_dir: PathBuf,
}

impl Settings {
    /// Layer `project` over `user` over the defaults.
    pub fn layered(project: ConfigFile, user: ConfigFile) -> Self {
        Self {
            source: project.analysis.source.or(user.analysis.source),
            format: project.output.format.or(user.output.format),
            seed: project
                .generate
                .seed
                .or(user.generate.seed)
                .unwrap_or(DEFAULT_SEED),
            out_dir: project
                .generate
                .out_dir
                .or(user.generate.out_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::layered(ConfigFile::default(), ConfigFile::default())
    }
}

/// Parse one config file. A missing file yields the empty config.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ConfigFile>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskgraph").join("config.toml"))
}

/// Load and layer the project and user configs.
///
/// An explicit `--config` path must exist; the implicit project and user
/// files are optional.
pub fn load_settings(explicit: Option<&Path>, project_root: &Path) -> Result<Settings> {
    let project = match explicit {
        Some(path) => {
            anyhow::ensure!(path.exists(), "Config file {} not found", path.display());
            load_config_file(path)?
        }
        None => load_config_file(&project_root.join(PROJECT_CONFIG_FILE))?,
    };

    let user = match user_config_path() {
        Some(path) => load_config_file(&path)?,
        None => ConfigFile::default(),
    };

    let settings = Settings::layered(project, user);
    debug!(?settings, "configuration resolved");
    Ok(settings)
}

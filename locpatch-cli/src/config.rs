//! Configuration file loading for locpatch.
//!
//! Discovers and loads `locpatch.toml` from the working root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use fs_err as fs;
use locpatch_core::settings::CoverageSettings;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "locpatch.toml";

/// Top-level configuration from locpatch.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocpatchConfig {
    pub paths: PathsConfig,
    pub coverage: CoverageConfig,
}

/// Where rule documents and translated sources live, relative to the root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding rule documents grouped by category.
    pub rules_dir: Utf8PathBuf,

    /// Root of the source tree that rule targets are relative to.
    pub source_root: Utf8PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            rules_dir: Utf8PathBuf::from("i18n"),
            source_root: Utf8PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Directory under the source root to scan for translatable files.
    pub scan_dir: Utf8PathBuf,

    /// Extensions of translatable files, without the dot.
    pub extensions: Vec<String>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        let d = CoverageSettings::default();
        Self {
            scan_dir: d.scan_dir,
            extensions: d.extensions,
        }
    }
}

/// Discover `locpatch.toml` in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a locpatch.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<LocpatchConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<LocpatchConfig> {
    let config: LocpatchConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<LocpatchConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(LocpatchConfig::default()),
    }
}

/// Path and coverage overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub rules_dir: Option<Utf8PathBuf>,
    pub source_root: Option<Utf8PathBuf>,
    pub scan_dir: Option<Utf8PathBuf>,
    pub extensions: Vec<String>,
}

/// Fully resolved locations, with relative paths joined onto the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub rules_dir: Utf8PathBuf,
    pub source_root: Utf8PathBuf,
    pub coverage: CoverageSettings,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: LocpatchConfig,
}

impl ConfigMerger {
    pub fn new(config: LocpatchConfig) -> Self {
        Self { config }
    }

    /// CLI values replace config file values; an empty extension list keeps the file's.
    pub fn merge(self, root: &Utf8Path, cli: CliOverrides) -> MergedConfig {
        let rules_dir = cli.rules_dir.unwrap_or(self.config.paths.rules_dir);
        let source_root = cli.source_root.unwrap_or(self.config.paths.source_root);
        let scan_dir = cli.scan_dir.unwrap_or(self.config.coverage.scan_dir);
        let extensions = if cli.extensions.is_empty() {
            self.config.coverage.extensions
        } else {
            cli.extensions
        };

        MergedConfig {
            rules_dir: resolve(root, rules_dir),
            source_root: resolve(root, source_root),
            coverage: CoverageSettings {
                scan_dir,
                extensions: extensions
                    .into_iter()
                    .map(|e| e.trim_start_matches('.').to_string())
                    .collect(),
            },
        }
    }
}

/// Join `path` onto `root` unless absolute, dropping `.` components so
/// glob results share the prefix.
fn resolve(root: &Utf8Path, path: Utf8PathBuf) -> Utf8PathBuf {
    let joined = if path.is_absolute() {
        path
    } else {
        root.join(path)
    };
    let normalized: Utf8PathBuf = joined
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    if normalized.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        normalized
    }
}

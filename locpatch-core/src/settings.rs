//! Clap-free settings for the pipelines.

use camino::Utf8PathBuf;
use locpatch_edit::CoverageScope;

/// Settings for the apply pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplySettings {
    /// Report what would change without touching any file.
    pub dry_run: bool,
}

/// Which source files count toward coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSettings {
    /// Relative to the source root.
    pub scan_dir: Utf8PathBuf,
    pub extensions: Vec<String>,
}

impl Default for CoverageSettings {
    fn default() -> Self {
        let scope = CoverageScope::default();
        Self {
            scan_dir: scope.scan_dir,
            extensions: scope.extensions,
        }
    }
}

impl CoverageSettings {
    pub fn scope(&self) -> CoverageScope {
        CoverageScope {
            scan_dir: self.scan_dir.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

/// Settings for the verify pipeline.
#[derive(Debug, Clone, Default)]
pub struct VerifySettings {
    /// Also run the full apply pipeline in dry-run mode.
    pub simulate: bool,
    pub coverage: CoverageSettings,
}

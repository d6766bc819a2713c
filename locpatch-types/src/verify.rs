use crate::ToolInfo;
use crate::apply::ApplyRun;
use crate::coverage::CoverageReport;
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rule whose `find` and `replace` disagree on their `{placeholder}` multisets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Utf8PathBuf>,

    pub target: Utf8PathBuf,
    pub find: String,
    pub replace: String,

    /// Placeholders in `find` that `replace` lacks (with multiplicity).
    #[serde(default)]
    pub missing: Vec<String>,

    /// Placeholders in `replace` that `find` lacks (with multiplicity).
    #[serde(default)]
    pub extra: Vec<String>,
}

/// An English attribute value in a configured target that no rule translates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTranslation {
    pub document: Utf8PathBuf,
    pub target: Utf8PathBuf,
    /// `title`, `label` or `placeholder`.
    pub attribute: String,
    pub text: String,
    /// 1-based line of the attribute in the (newline-normalized) target.
    pub line: u64,
}

impl MissingTranslation {
    /// The attribute as written in the source, e.g. `title="Settings"`.
    pub fn source_text(&self) -> String {
        format!("{}=\"{}\"", self.attribute, self.text)
    }
}

/// A rule document that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub document: Utf8PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub document: Utf8PathBuf,
    pub kind: ValidationKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    MissingFileField,
    TargetMissing,
    TargetOutsideRoot,
}

/// A rule document whose target no longer belongs to the translated source set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsoleteRuleSet {
    pub document: Utf8PathBuf,
    pub target: Utf8PathBuf,
    pub reason: ObsoleteReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObsoleteReason {
    /// The target file was deleted upstream.
    FileMissing,
    /// The target exists but is outside the eligible scan set.
    OutOfScope,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub documents: u64,
    pub rules: u64,
}

/// Counts over the loaded rule documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStats {
    pub documents: u64,
    pub load_failures: u64,
    pub rules: u64,

    #[serde(default)]
    pub categories: BTreeMap<String, CategoryStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub started_at: DateTime<Utc>,

    pub stats: ConfigStats,

    #[serde(default)]
    pub load_failures: Vec<LoadFailure>,

    #[serde(default)]
    pub validation_errors: Vec<ValidationError>,

    #[serde(default)]
    pub integrity_issues: Vec<IntegrityIssue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<ApplyRun>,

    /// `None` when the scan directory does not exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageReport>,

    #[serde(default)]
    pub obsolete: Vec<ObsoleteRuleSet>,

    /// Uncovered, non-skipped eligible files that contain translatable text.
    #[serde(default)]
    pub new_files: Vec<Utf8PathBuf>,

    #[serde(default)]
    pub missing_translations: Vec<MissingTranslation>,
}

impl VerifyReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: crate::schema::LOCPATCH_VERIFY_V1.to_string(),
            tool,
            started_at: Utc::now(),
            stats: ConfigStats::default(),
            load_failures: vec![],
            validation_errors: vec![],
            integrity_issues: vec![],
            simulation: None,
            coverage: None,
            obsolete: vec![],
            new_files: vec![],
            missing_translations: vec![],
        }
    }

    /// True if verify found anything to act on. Coverage and obsolete
    /// documents are informational.
    pub fn has_problems(&self) -> bool {
        !self.integrity_issues.is_empty()
            || !self.validation_errors.is_empty()
            || !self.load_failures.is_empty()
            || !self.new_files.is_empty()
            || !self.missing_translations.is_empty()
    }
}

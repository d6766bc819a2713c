use crate::ToolInfo;
use crate::rules::MatchStrategy;
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one apply (or dry-run) pass over every loaded rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRun {
    pub schema: String,
    pub tool: ToolInfo,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub outcomes: Vec<ApplyOutcome>,

    pub summary: ApplySummary,
}

impl ApplyRun {
    pub fn new(tool: ToolInfo, dry_run: bool) -> Self {
        Self {
            schema: crate::schema::LOCPATCH_APPLY_V1.to_string(),
            tool,
            dry_run,
            started_at: Utc::now(),
            ended_at: None,
            outcomes: vec![],
            summary: ApplySummary::default(),
        }
    }

    /// Append an outcome and fold it into the summary.
    pub fn push(&mut self, outcome: ApplyOutcome) {
        self.summary.record(&outcome);
        self.outcomes.push(outcome);
    }
}

/// Per-target-file result of applying one rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// Rule document the rule set came from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Utf8PathBuf>,

    pub target: Utf8PathBuf,
    pub status: FileStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub replacements: ReplacementCounts,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleResult>,

    /// True when the changed content was written back to disk.
    #[serde(default)]
    pub written: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_before: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_after: Option<String>,
}

impl ApplyOutcome {
    pub fn skipped(target: Utf8PathBuf, reason: SkipReason, message: Option<String>) -> Self {
        Self {
            document: None,
            target,
            status: FileStatus::Skipped,
            skip_reason: Some(reason),
            message,
            replacements: ReplacementCounts::default(),
            rules: vec![],
            written: false,
            sha256_before: None,
            sha256_after: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Succeeded
    }

    /// True if the content differs after substitution.
    pub fn changed(&self) -> bool {
        self.sha256_before.is_some() && self.sha256_before != self.sha256_after
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// At least one rule matched and the write (if any) succeeded.
    Succeeded,
    /// No rule matched.
    Unmatched,
    /// Rules matched but writing the file back failed.
    WriteFailed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingTargetField,
    NoReplacements,
    TargetMissing,
    /// Absolute target, or one that climbs out of the source root.
    TargetOutsideRoot,
    ReadFailed,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::MissingTargetField => "missing target field",
            SkipReason::NoReplacements => "no replacements",
            SkipReason::TargetMissing => "target missing",
            SkipReason::TargetOutsideRoot => "target outside source root",
            SkipReason::ReadFailed => "read failed",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single rule within a rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    pub find: String,
    pub strategy: MatchStrategy,
    pub matched: bool,

    /// Number of non-overlapping occurrences replaced.
    #[serde(default)]
    pub occurrences: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementCounts {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl ReplacementCounts {
    pub fn add(&mut self, other: &ReplacementCounts) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub total: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub files: FileCounts,
    pub replacements: ReplacementCounts,

    /// Files whose content was written back.
    #[serde(default)]
    pub files_written: u64,
}

impl ApplySummary {
    pub fn record(&mut self, outcome: &ApplyOutcome) {
        self.files.total += 1;
        match outcome.status {
            FileStatus::Succeeded => self.files.succeeded += 1,
            FileStatus::Skipped => self.files.skipped += 1,
            FileStatus::Unmatched | FileStatus::WriteFailed => self.files.failed += 1,
        }
        self.replacements.add(&outcome.replacements);
        if outcome.written {
            self.files_written += 1;
        }
    }
}

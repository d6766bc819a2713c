//! Shared DTOs (schemas-as-code) for the locpatch workspace.
//!
//! # Design constraints
//! - Report types are serialized to disk and consumed by other tools.
//! - Rule sets are immutable once loaded; match strategies are fixed at construction.
//! - Prefer adding optional fields over changing semantics.

pub mod apply;
pub mod coverage;
pub mod rules;
pub mod verify;

use serde::{Deserialize, Serialize};

/// Schema identifiers.
pub mod schema {
    pub const LOCPATCH_APPLY_V1: &str = "locpatch.apply.v1";
    pub const LOCPATCH_VERIFY_V1: &str = "locpatch.verify.v1";
    pub const LOCPATCH_COVERAGE_V1: &str = "locpatch.coverage.v1";
}

/// Identifies the tool that produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ToolInfo {
    pub fn locpatch(version: &str) -> Self {
        Self {
            name: "locpatch".to_string(),
            version: Some(version.to_string()),
        }
    }
}

/// Replace CRLF line endings with LF.
///
/// Content, `find` and `replace` strings all pass through this before matching.
pub fn normalize_newlines(s: &str) -> String {
    if s.contains("\r\n") {
        s.replace("\r\n", "\n")
    } else {
        s.to_string()
    }
}

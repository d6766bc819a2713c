//! Edit engine for locpatch rule sets.
//!
//! Responsibilities:
//! - Extract `{placeholder}` multisets and flag rules that lose or invent them.
//! - Match rules against file content (word-boundary for bare identifiers, literal otherwise).
//! - Apply rule sets through a [`SourceTree`], in memory or to disk.
//! - Compute translation coverage over a source tree.
//! - Flag new files and attribute text that still need rules.
//! - Generate a unified diff preview of what an apply changed (or would change).

mod apply;
mod coverage;
mod error;
mod integrity;
mod matcher;
mod patch;
mod placeholder;
mod scan;
mod source;

pub use apply::{ApplyOptions, Applier, apply_rule_set};
pub use coverage::{CoverageScope, analyze_coverage, eligible_files, find_obsolete};
pub use error::{SourceError, SourceResult};
pub use integrity::{check_rule, check_rule_set};
pub use matcher::{Substitution, find_occurrences, substitute};
pub use patch::render_patch;
pub use placeholder::{extract_placeholders, placeholder_diff};
pub use scan::{
    detect_new_files, find_missing_translations, has_translatable_text, scan_missing_translations,
};
pub use source::{FsSourceTree, InMemorySourceTree, SourceTree};

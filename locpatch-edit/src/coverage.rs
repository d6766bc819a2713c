use crate::error::SourceResult;
use crate::source::SourceTree;
use camino::{Utf8Path, Utf8PathBuf};
use locpatch_types::coverage::{CoverageReport, percentage};
use locpatch_types::rules::{RuleSet, canonical_target};
use locpatch_types::verify::{ObsoleteReason, ObsoleteRuleSet};
use std::collections::BTreeSet;
use tracing::debug;

/// Which files count as translatable sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageScope {
    /// Directory to scan, relative to the source root.
    pub scan_dir: Utf8PathBuf,
    /// File extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for CoverageScope {
    fn default() -> Self {
        Self {
            scan_dir: Utf8PathBuf::from("src"),
            extensions: vec!["tsx".to_string(), "jsx".to_string()],
        }
    }
}

/// Eligible source files under the scope, relative to the source root, sorted.
pub fn eligible_files(tree: &dyn SourceTree, scope: &CoverageScope) -> SourceResult<Vec<Utf8PathBuf>> {
    tree.list_files(&scope.scan_dir, &scope.extensions)
}

/// Distinct non-empty target paths under the source root declared by `sets`.
fn configured_targets<'s>(sets: impl IntoIterator<Item = &'s RuleSet>) -> BTreeSet<Utf8PathBuf> {
    sets.into_iter()
        .filter(|s| s.has_target() && s.target_within_root())
        .map(|s| s.target.clone())
        .collect()
}

/// Compute coverage of the eligible files by the given rule sets.
///
/// Uncovered files listed in `skip_list` are reported separately and do not
/// change the percentage.
pub fn analyze_coverage<'s>(
    tree: &dyn SourceTree,
    scope: &CoverageScope,
    sets: impl IntoIterator<Item = &'s RuleSet>,
    skip_list: &[Utf8PathBuf],
) -> SourceResult<CoverageReport> {
    let eligible = eligible_files(tree, scope)?;
    let configured = configured_targets(sets);
    let skip: BTreeSet<Utf8PathBuf> = skip_list.iter().map(|p| canonical_target(p.as_str())).collect();

    let mut covered = 0u64;
    let mut uncovered = Vec::new();
    let mut skipped = Vec::new();
    for file in &eligible {
        if configured.contains(file) {
            covered += 1;
        } else if skip.contains(file) {
            skipped.push(file.clone());
        } else {
            uncovered.push(file.clone());
        }
    }

    let eligible_count = eligible.len() as u64;
    let configured_count = configured.len() as u64;
    debug!(
        eligible = eligible_count,
        configured = configured_count,
        covered,
        "computed coverage"
    );

    Ok(CoverageReport {
        schema: locpatch_types::schema::LOCPATCH_COVERAGE_V1.to_string(),
        scan_dir: scope.scan_dir.clone(),
        extensions: scope.extensions.clone(),
        eligible: eligible_count,
        configured: configured_count,
        covered,
        percentage: percentage(configured_count, eligible_count),
        uncovered,
        skipped,
    })
}

/// Rule sets whose target was deleted or has left the eligible file set.
pub fn find_obsolete<'s>(
    tree: &dyn SourceTree,
    eligible: &[Utf8PathBuf],
    sets: impl IntoIterator<Item = (&'s Utf8Path, &'s RuleSet)>,
) -> Vec<ObsoleteRuleSet> {
    let eligible: BTreeSet<&Utf8PathBuf> = eligible.iter().collect();
    let mut out = Vec::new();

    for (document, set) in sets {
        // Escaping targets are validation errors, not obsolete documents.
        if !set.has_target() || !set.target_within_root() {
            continue;
        }
        let target = set.target.clone();
        let reason = if !tree.exists(&target) {
            ObsoleteReason::FileMissing
        } else if !eligible.contains(&target) {
            ObsoleteReason::OutOfScope
        } else {
            continue;
        };
        out.push(ObsoleteRuleSet {
            document: document.to_path_buf(),
            target,
            reason,
        });
    }

    out
}

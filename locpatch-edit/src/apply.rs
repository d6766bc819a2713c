use crate::matcher::substitute;
use crate::patch::render_patch;
use crate::source::SourceTree;
use camino::{Utf8Path, Utf8PathBuf};
use locpatch_types::apply::{
    ApplyOutcome, FileStatus, ReplacementCounts, RuleResult, SkipReason,
};
use locpatch_types::normalize_newlines;
use locpatch_types::rules::RuleSet;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Compute outcomes without writing anything back.
    pub dry_run: bool,
}

/// Applies rule sets one after another against a [`SourceTree`].
///
/// Substitution always runs on an in-memory copy and later rule sets for the same
/// file see earlier results, in both modes. Only the write step depends on
/// `dry_run`, so a dry run reports exactly the counts a real run would.
pub struct Applier<'a> {
    tree: &'a dyn SourceTree,
    opts: ApplyOptions,
    /// Content as first read from the tree (newline-normalized), for the patch preview.
    original: BTreeMap<Utf8PathBuf, String>,
    /// Latest content per file after substitution.
    current: BTreeMap<Utf8PathBuf, String>,
}

impl<'a> Applier<'a> {
    pub fn new(tree: &'a dyn SourceTree, opts: ApplyOptions) -> Self {
        Self {
            tree,
            opts,
            original: BTreeMap::new(),
            current: BTreeMap::new(),
        }
    }

    pub fn dry_run(&self) -> bool {
        self.opts.dry_run
    }

    pub fn apply(&mut self, set: &RuleSet) -> ApplyOutcome {
        let target = set.target.clone();

        if !set.has_target() {
            return ApplyOutcome::skipped(target, SkipReason::MissingTargetField, None);
        }
        if !set.target_within_root() {
            warn!(target = %target, "refusing target outside the source root");
            return ApplyOutcome::skipped(target, SkipReason::TargetOutsideRoot, None);
        }
        if set.rules.is_empty() {
            return ApplyOutcome::skipped(target, SkipReason::NoReplacements, None);
        }

        let loaded = match self.load(&target) {
            Ok(content) => content,
            Err(outcome) => return *outcome,
        };

        let mut content = loaded.clone();
        let mut counts = ReplacementCounts {
            total: set.rules.len() as u64,
            ..ReplacementCounts::default()
        };
        let mut results = Vec::with_capacity(set.rules.len());

        for rule in &set.rules {
            let sub = substitute(&content, rule);
            if sub.matched() {
                counts.succeeded += 1;
            } else {
                counts.failed += 1;
                debug!(target = %target, find = %rule.find, "rule did not match");
            }
            results.push(RuleResult {
                find: rule.find.clone(),
                strategy: rule.strategy,
                matched: sub.matched(),
                occurrences: sub.occurrences,
            });
            if let Some(output) = sub.output {
                content = output;
            }
        }

        let mut outcome = ApplyOutcome {
            document: None,
            target: target.clone(),
            status: FileStatus::Unmatched,
            skip_reason: None,
            message: None,
            replacements: counts,
            rules: results,
            written: false,
            sha256_before: None,
            sha256_after: None,
        };

        let mut write_failed = false;
        if content != loaded {
            outcome.sha256_before = Some(sha256_hex(loaded.as_bytes()));
            outcome.sha256_after = Some(sha256_hex(content.as_bytes()));

            if self.opts.dry_run {
                self.current.insert(target.clone(), content);
            } else {
                match self.tree.write(&target, &content) {
                    Ok(()) => {
                        outcome.written = true;
                        self.current.insert(target.clone(), content);
                    }
                    Err(err) => {
                        warn!(target = %target, error = %err, "failed to write translated file");
                        outcome.message = Some(err.to_string());
                        write_failed = true;
                    }
                }
            }
        }

        outcome.status = if write_failed {
            FileStatus::WriteFailed
        } else if counts.succeeded > 0 {
            FileStatus::Succeeded
        } else {
            FileStatus::Unmatched
        };

        debug!(
            target = %target,
            succeeded = counts.succeeded,
            failed = counts.failed,
            status = ?outcome.status,
            "applied rule set"
        );

        outcome
    }

    /// Newline-normalized content of `target`, preferring earlier in-run results.
    fn load(&mut self, target: &Utf8Path) -> Result<String, Box<ApplyOutcome>> {
        if let Some(content) = self.current.get(target) {
            return Ok(content.clone());
        }

        if !self.tree.exists(target) {
            debug!(target = %target, "target file missing");
            return Err(Box::new(ApplyOutcome::skipped(
                target.to_path_buf(),
                SkipReason::TargetMissing,
                None,
            )));
        }

        let raw = self.tree.read_to_string(target).map_err(|err| {
            warn!(target = %target, error = %err, "failed to read target file");
            Box::new(ApplyOutcome::skipped(
                target.to_path_buf(),
                SkipReason::ReadFailed,
                Some(err.message()),
            ))
        })?;

        let normalized = normalize_newlines(&raw);
        self.original.insert(target.to_path_buf(), normalized.clone());
        self.current.insert(target.to_path_buf(), normalized.clone());
        Ok(normalized)
    }

    /// Unified diff of every file changed so far (or that would change, in a dry run).
    pub fn patch(&self) -> String {
        render_patch(&self.original, &self.current)
    }
}

/// Apply a single rule set on its own.
pub fn apply_rule_set(tree: &dyn SourceTree, set: &RuleSet, opts: ApplyOptions) -> ApplyOutcome {
    Applier::new(tree, opts).apply(set)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

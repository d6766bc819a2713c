//! Port traits abstracting rule loading and artifact output away from the pipeline.

use camino::Utf8Path;
use locpatch_rules::{LoadedRuleSet, SkipList};

/// Source of rule documents.
pub trait RuleSetSource {
    /// Every rule document, sorted by path, with per-document load errors kept in place.
    fn load_rule_sets(&self) -> anyhow::Result<Vec<LoadedRuleSet>>;

    /// Files deliberately left untranslated. Missing means empty.
    fn load_skip_list(&self) -> SkipList;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}

//! Default filesystem-backed port implementations.

use crate::ports::{RuleSetSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use locpatch_rules::{
    LoadedRuleSet, RESERVED_FILE_NAMES, SkipList, category_of, load_rule_sets, load_skip_list,
    without_cur_dir,
};
use locpatch_types::rules::RuleSet;
use tracing::debug;

/// Loads rule documents from a rules directory via `locpatch_rules::load_rule_sets`.
///
/// Document paths are reported relative to the rules directory.
#[derive(Debug, Clone)]
pub struct FsRuleSetSource {
    pub rules_dir: Utf8PathBuf,
}

impl FsRuleSetSource {
    pub fn new(rules_dir: Utf8PathBuf) -> Self {
        Self {
            rules_dir: without_cur_dir(&rules_dir),
        }
    }
}

impl RuleSetSource for FsRuleSetSource {
    fn load_rule_sets(&self) -> anyhow::Result<Vec<LoadedRuleSet>> {
        let mut loaded = load_rule_sets(&self.rules_dir)
            .with_context(|| format!("load rule documents from {}", self.rules_dir))?;
        for entry in &mut loaded {
            if let Ok(rel) = entry.path.strip_prefix(&self.rules_dir) {
                entry.path = rel.to_path_buf();
            }
        }
        Ok(loaded)
    }

    fn load_skip_list(&self) -> SkipList {
        load_skip_list(&self.rules_dir)
    }
}

/// In-memory rule source for embedding and testing.
///
/// Drops entries with reserved file names and sorts by path on construction
/// to match `FsRuleSetSource`'s deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleSetSource {
    rule_sets: Vec<LoadedRuleSet>,
    skip_list: SkipList,
}

impl InMemoryRuleSetSource {
    pub fn new(mut rule_sets: Vec<LoadedRuleSet>) -> Self {
        rule_sets.retain(|r| {
            let reserved = RESERVED_FILE_NAMES.contains(&r.file_name.as_str());
            if reserved {
                debug!(path = r.path.as_str(), "skipping reserved file");
            }
            !reserved
        });
        rule_sets.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            rule_sets,
            skip_list: SkipList::default(),
        }
    }

    /// Build from `(document path, rule set)` pairs, deriving category and file name.
    pub fn from_rule_sets<I, P>(sets: I) -> Self
    where
        I: IntoIterator<Item = (P, RuleSet)>,
        P: Into<Utf8PathBuf>,
    {
        let entries = sets
            .into_iter()
            .map(|(path, set)| {
                let path = path.into();
                LoadedRuleSet {
                    category: category_of(Utf8Path::new(""), &path),
                    file_name: path.file_name().unwrap_or_default().to_string(),
                    path,
                    rule_set: Ok(set),
                }
            })
            .collect();
        Self::new(entries)
    }

    pub fn with_skip_list(mut self, skip_list: SkipList) -> Self {
        self.skip_list = skip_list;
        self
    }
}

impl RuleSetSource for InMemoryRuleSetSource {
    fn load_rule_sets(&self) -> anyhow::Result<Vec<LoadedRuleSet>> {
        Ok(self.rule_sets.clone())
    }

    fn load_skip_list(&self) -> SkipList {
        self.skip_list.clone()
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locpatch_rules::RuleSetLoadError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn failed(path: &str) -> LoadedRuleSet {
        let path = Utf8PathBuf::from(path);
        LoadedRuleSet {
            category: category_of(Utf8Path::new(""), &path),
            file_name: path.file_name().unwrap_or_default().to_string(),
            path,
            rule_set: Err(RuleSetLoadError::Json {
                message: "stub".to_string(),
            }),
        }
    }

    #[test]
    fn in_memory_sorts_by_path() {
        let source = InMemoryRuleSetSource::from_rule_sets([
            ("tui/z.json", RuleSet::from_pairs("src/z.tsx", [("a", "b")])),
            ("common/a.json", RuleSet::from_pairs("src/a.tsx", [("a", "b")])),
            ("tui/m.json", RuleSet::from_pairs("src/m.tsx", [("a", "b")])),
        ]);
        let loaded = source.load_rule_sets().unwrap();
        let paths: Vec<&str> = loaded.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["common/a.json", "tui/m.json", "tui/z.json"]);
        assert_eq!(loaded[0].category, "common");
        assert_eq!(loaded[0].file_name, "a.json");
    }

    #[test]
    fn in_memory_preserves_errors_and_drops_reserved() {
        let source = InMemoryRuleSetSource::new(vec![
            failed("tui/bad.json"),
            failed("skip-files.json"),
            failed("config.json"),
        ]);
        let loaded = source.load_rule_sets().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].rule_set.is_err());
    }

    #[test]
    fn in_memory_top_level_document_is_root_category() {
        let source = InMemoryRuleSetSource::from_rule_sets([(
            "top.json",
            RuleSet::from_pairs("src/a.tsx", [("a", "b")]),
        )]);
        assert_eq!(source.load_rule_sets().unwrap()[0].category, "root");
    }

    #[test]
    fn fs_source_reports_relative_document_paths() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::create_dir_all(root.join("dialogs")).unwrap();
        std::fs::write(
            root.join("dialogs/login.json"),
            r#"{"file": "src/login.tsx", "replacements": {"Login": "登录"}}"#,
        )
        .unwrap();
        std::fs::write(
            root.join("skip-files.json"),
            r#"{"files": ["src/ctx.tsx"], "reasons": {"src/ctx.tsx": "no UI text"}}"#,
        )
        .unwrap();

        let source = FsRuleSetSource::new(root);
        let loaded = source.load_rule_sets().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].path, Utf8PathBuf::from("dialogs/login.json"));
        assert_eq!(loaded[0].category, "dialogs");

        let skip = source.load_skip_list();
        assert!(skip.contains(Utf8Path::new("src/ctx.tsx")));
    }

    #[test]
    fn fs_write_port_creates_parents() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let target = root.join("out/nested/apply.json");

        FsWritePort.write_file(&target, b"{}").unwrap();

        assert_eq!(std::fs::read_to_string(target).unwrap(), "{}");
    }
}

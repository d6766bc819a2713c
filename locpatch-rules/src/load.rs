use crate::RESERVED_FILE_NAMES;
use crate::document::parse_rule_set;
use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{Pattern, glob};
use locpatch_types::rules::RuleSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Category used for documents placed directly in the rules directory.
pub const ROOT_CATEGORY: &str = "root";

#[derive(Debug, Clone)]
pub struct LoadedRuleSet {
    pub path: Utf8PathBuf,
    /// First directory component under the rules directory.
    pub category: String,
    pub file_name: String,
    pub rule_set: Result<RuleSet, RuleSetLoadError>,
}

impl LoadedRuleSet {
    pub fn ok(&self) -> Option<&RuleSet> {
        self.rule_set.as_ref().ok()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleSetLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },
}

/// Load every rule document under `rules_dir`, sorted by path.
///
/// A missing directory yields an empty list; per-document failures are
/// returned in place of the rule set.
pub fn load_rule_sets(rules_dir: &Utf8Path) -> anyhow::Result<Vec<LoadedRuleSet>> {
    let rules_dir = without_cur_dir(rules_dir);
    let rules_dir = rules_dir.as_path();
    let pattern = format!("{}/**/*.json", Pattern::escape(rules_dir.as_str()));
    let pattern_str = pattern.as_str();

    debug!(pattern = %pattern_str, "scanning for rule documents");

    let mut out = Vec::new();
    for entry in glob(pattern_str).context("glob rules/**/*.json")? {
        let path = entry
            .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
            .to_string_lossy()
            .to_string();
        let utf8_path = Utf8PathBuf::from(path);

        let file_name = utf8_path.file_name().unwrap_or_default().to_string();
        if RESERVED_FILE_NAMES.contains(&file_name.as_str()) {
            debug!(path = %utf8_path, "skipping reserved file");
            continue;
        }

        let category = category_of(rules_dir, &utf8_path);

        let rule_set = match fs::read_to_string(&utf8_path) {
            Ok(s) => parse_rule_set(&s).map_err(|e| RuleSetLoadError::Json {
                message: e.to_string(),
            }),
            Err(e) => Err(RuleSetLoadError::Io {
                message: e.to_string(),
            }),
        };

        if let Err(err) = &rule_set {
            warn!(path = %utf8_path, error = %err, "skipping invalid rule document");
        }

        out.push(LoadedRuleSet {
            path: utf8_path,
            category,
            file_name,
            rule_set,
        });
    }

    // Deterministic order matters: rule sets touching the same file apply in this order.
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

/// `dir` with `.` components removed, matching the paths glob yields.
pub fn without_cur_dir(dir: &Utf8Path) -> Utf8PathBuf {
    let out: Utf8PathBuf = dir
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    if out.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        out
    }
}

/// Category of a document: its first directory under `rules_dir`, or [`ROOT_CATEGORY`].
pub fn category_of(rules_dir: &Utf8Path, path: &Utf8Path) -> String {
    let rel = path.strip_prefix(rules_dir).unwrap_or(path);
    let mut components = rel.components();
    match (components.next(), components.next()) {
        (Some(first), Some(_)) => first.as_str().to_string(),
        _ => ROOT_CATEGORY.to_string(),
    }
}

//! Rule document ingestion.
//!
//! Rule documents are JSON files under a rules directory, grouped into category
//! subdirectories. Loading is tolerant: a document that cannot be read or parsed
//! is reported next to the ones that loaded, never aborting the run.

mod document;
mod load;
mod skip;

pub use document::{RuleDocument, parse_rule_set};
pub use load::{
    LoadedRuleSet, ROOT_CATEGORY, RuleSetLoadError, category_of, load_rule_sets,
    without_cur_dir,
};
pub use skip::{SKIP_LIST_FILE_NAME, SkipList, load_skip_list};

/// File names under the rules directory that are never rule documents.
pub const RESERVED_FILE_NAMES: &[&str] = &[SKIP_LIST_FILE_NAME, "config.json"];

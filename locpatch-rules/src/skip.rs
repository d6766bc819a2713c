use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const SKIP_LIST_FILE_NAME: &str = "skip-files.json";

/// Source files deliberately left without a rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipList {
    pub files: Vec<Utf8PathBuf>,
    pub reasons: BTreeMap<String, String>,
}

impl SkipList {
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    pub fn reason(&self, path: &Utf8Path) -> Option<&str> {
        self.reasons.get(path.as_str()).map(String::as_str)
    }
}

/// Load `skip-files.json` from the rules directory.
///
/// A missing or malformed skip list is treated as empty.
pub fn load_skip_list(rules_dir: &Utf8Path) -> SkipList {
    let path = rules_dir.join(SKIP_LIST_FILE_NAME);
    if !path.exists() {
        debug!(path = %path, "no skip list");
        return SkipList::default();
    }

    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<SkipList>(&s).map_err(|e| e.to_string()));

    match parsed {
        Ok(list) => list,
        Err(error) => {
            warn!(path = %path, %error, "ignoring unreadable skip list");
            SkipList::default()
        }
    }
}

use crate::error::{SourceError, SourceResult};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{Pattern, glob};
use locpatch_types::rules::is_within_root;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// File access to the tree being translated.
///
/// All engine I/O goes through this so runs can be tested against [`InMemorySourceTree`].
/// Paths are relative to [`SourceTree::root`].
pub trait SourceTree {
    fn root(&self) -> &Utf8Path;

    fn exists(&self, rel: &Utf8Path) -> bool;

    fn is_dir(&self, rel: &Utf8Path) -> bool;

    fn read_to_string(&self, rel: &Utf8Path) -> SourceResult<String>;

    fn write(&self, rel: &Utf8Path, contents: &str) -> SourceResult<()>;

    /// Files under `dir` whose extension is in `extensions`, relative to the root, sorted.
    fn list_files(&self, dir: &Utf8Path, extensions: &[String]) -> SourceResult<Vec<Utf8PathBuf>>;
}

/// File-system backed `SourceTree`.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: Utf8PathBuf,
}

impl FsSourceTree {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// `rel` joined onto the root; rule targets may not leave it.
    fn confined(&self, rel: &Utf8Path) -> SourceResult<Utf8PathBuf> {
        if is_within_root(rel) {
            Ok(self.root.join(rel))
        } else {
            Err(SourceError::OutsideRoot {
                path: rel.to_path_buf(),
            })
        }
    }

    /// Configured directories (scan dir) are trusted and may be absolute.
    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl SourceTree for FsSourceTree {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.confined(rel).is_ok_and(|p| p.is_file())
    }

    fn is_dir(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_dir()
    }

    fn read_to_string(&self, rel: &Utf8Path) -> SourceResult<String> {
        let abs = self.confined(rel)?;
        fs::read_to_string(&abs).map_err(|e| SourceError::Read {
            path: rel.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write(&self, rel: &Utf8Path, contents: &str) -> SourceResult<()> {
        let abs = self.confined(rel)?;
        fs::write(&abs, contents).map_err(|e| SourceError::Write {
            path: rel.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn list_files(&self, dir: &Utf8Path, extensions: &[String]) -> SourceResult<Vec<Utf8PathBuf>> {
        let base = self.abs(dir);
        let list_err = |message: String| SourceError::List {
            path: dir.to_path_buf(),
            message,
        };

        let mut out = BTreeSet::new();
        for ext in extensions {
            let pattern = format!(
                "{}/**/*.{}",
                Pattern::escape(base.as_str()),
                Pattern::escape(ext.trim_start_matches('.'))
            );
            debug!(pattern = %pattern, "scanning for source files");

            for entry in glob(pattern.as_str()).map_err(|e| list_err(e.to_string()))? {
                let path = entry.map_err(|e| list_err(e.to_string()))?;
                if !path.is_file() {
                    continue;
                }
                let path = Utf8PathBuf::from_path_buf(path)
                    .map_err(|p| list_err(format!("non-UTF-8 path {}", p.display())))?;
                let rel = path
                    .strip_prefix(&self.root)
                    .map(Utf8Path::to_path_buf)
                    .unwrap_or(path);
                out.insert(rel);
            }
        }
        Ok(out.into_iter().collect())
    }
}

/// In-memory `SourceTree` for embedding and testing.
///
/// Reads and writes of individual paths can be made to fail to exercise
/// the skip and write-failure paths.
#[derive(Debug, Default)]
pub struct InMemorySourceTree {
    root: Utf8PathBuf,
    files: RefCell<BTreeMap<Utf8PathBuf, String>>,
    unreadable: BTreeSet<Utf8PathBuf>,
    read_only: BTreeSet<Utf8PathBuf>,
    writes: RefCell<u64>,
}

impl InMemorySourceTree {
    pub fn new() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            ..Self::default()
        }
    }

    pub fn with_file(self, rel: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(rel.into(), contents.into());
        self
    }

    /// Make reads of `rel` fail even though it exists.
    pub fn fail_reads(mut self, rel: impl Into<Utf8PathBuf>) -> Self {
        self.unreadable.insert(rel.into());
        self
    }

    /// Make writes to `rel` fail.
    pub fn fail_writes(mut self, rel: impl Into<Utf8PathBuf>) -> Self {
        self.read_only.insert(rel.into());
        self
    }

    pub fn get(&self, rel: &str) -> Option<String> {
        self.files.borrow().get(Utf8Path::new(rel)).cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        *self.writes.borrow()
    }
}

fn under(dir: &Utf8Path, path: &Utf8Path) -> bool {
    dir.as_str().is_empty() || dir == Utf8Path::new(".") || path.starts_with(dir)
}

impl SourceTree for InMemorySourceTree {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.files.borrow().contains_key(rel)
    }

    fn is_dir(&self, rel: &Utf8Path) -> bool {
        self.files
            .borrow()
            .keys()
            .any(|p| p != rel && under(rel, p))
    }

    fn read_to_string(&self, rel: &Utf8Path) -> SourceResult<String> {
        if self.unreadable.contains(rel) {
            return Err(SourceError::Read {
                path: rel.to_path_buf(),
                message: "permission denied".to_string(),
            });
        }
        self.files
            .borrow()
            .get(rel)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                path: rel.to_path_buf(),
            })
    }

    fn write(&self, rel: &Utf8Path, contents: &str) -> SourceResult<()> {
        if self.read_only.contains(rel) {
            return Err(SourceError::Write {
                path: rel.to_path_buf(),
                message: "read-only file system".to_string(),
            });
        }
        self.files
            .borrow_mut()
            .insert(rel.to_path_buf(), contents.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn list_files(&self, dir: &Utf8Path, extensions: &[String]) -> SourceResult<Vec<Utf8PathBuf>> {
        let files = self.files.borrow();
        Ok(files
            .keys()
            .filter(|p| under(dir, p))
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| extensions.iter().any(|e| e.trim_start_matches('.') == ext))
            })
            .cloned()
            .collect())
    }
}

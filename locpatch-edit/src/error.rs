//! Error types for source tree access.
//!
//! None of these abort a run: the applier turns them into skip or
//! write-failure outcomes on the affected rule set.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The file does not exist under the source root.
    #[error("not found: {path}")]
    NotFound { path: Utf8PathBuf },

    /// Absolute path, or one that climbs out of the source root.
    #[error("outside source root: {path}")]
    OutsideRoot { path: Utf8PathBuf },

    #[error("read {path}: {message}")]
    Read { path: Utf8PathBuf, message: String },

    #[error("write {path}: {message}")]
    Write { path: Utf8PathBuf, message: String },

    #[error("list {path}: {message}")]
    List { path: Utf8PathBuf, message: String },
}

impl SourceError {
    /// The underlying cause without the path prefix.
    pub fn message(&self) -> String {
        match self {
            SourceError::NotFound { .. } => "not found".to_string(),
            SourceError::OutsideRoot { .. } => "outside source root".to_string(),
            SourceError::Read { message, .. }
            | SourceError::Write { message, .. }
            | SourceError::List { message, .. } => message.clone(),
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::SourceError;

    #[test]
    fn display_includes_path_and_cause() {
        let err = SourceError::Write {
            path: "src/app.tsx".into(),
            message: "read-only file system".to_string(),
        };
        assert_eq!(err.to_string(), "write src/app.tsx: read-only file system");
        assert_eq!(err.message(), "read-only file system");
    }

    #[test]
    fn not_found_message() {
        let err = SourceError::NotFound {
            path: "gone.tsx".into(),
        };
        assert!(err.to_string().contains("gone.tsx"));
        assert_eq!(err.message(), "not found");
    }
}

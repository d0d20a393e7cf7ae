//! File-backed resource root used by body templates.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Error type for file resource lookups.
#[derive(Debug, Error)]
pub enum FileSourceError {
    /// The requested path is absolute or climbs out of the root.
    #[error("Path '{0}' is outside the files root")]
    OutsideRoot(String),

    /// Failed to read the file.
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        /// Resolved path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// A read-only directory of resources that templates may reference.
///
/// Lookups are confined to the root: absolute paths and `..` components
/// are rejected before touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Creates a file source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative path against the root.
    ///
    /// # Errors
    ///
    /// Returns [`FileSourceError::OutsideRoot`] if `relative` is absolute
    /// or contains `..`.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, FileSourceError> {
        let path = Path::new(relative);
        let confined = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !confined || relative.is_empty() {
            return Err(FileSourceError::OutsideRoot(relative.to_string()));
        }

        Ok(self.root.join(path))
    }

    /// Reads a UTF-8 text file relative to the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path escapes the root or the file cannot be read.
    pub fn read_text(&self, relative: &str) -> Result<String, FileSourceError> {
        let path = self.resolve(relative)?;
        std::fs::read_to_string(&path).map_err(|source| FileSourceError::Read { path, source })
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(crate::config::defaults::FILES_ROOT)
    }
}

//! Filesystem query interface used by the resolver
//!
//! The resolver only ever asks three questions of the filesystem: does a file
//! exist, does a directory exist, and what are a directory's immediate
//! subdirectories. Both a std-backed and an in-memory implementation are
//! provided; the resolver itself never touches `std::fs` directly.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A directory listing that could not be produced
///
/// The resolver treats this as "no subdirectories" rather than a fatal
/// condition; the type exists so that mapping is written out explicitly at the
/// call site instead of being swallowed.
#[derive(Debug, Error)]
#[error("failed to list directory {path:?}: {source}")]
pub struct ListDirError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Read-only filesystem queries
///
/// Implementations must never write; the resolver only observes.
pub trait FileSystem {
    /// Check whether a regular file exists at `path`
    fn file_exists(&self, path: &Path) -> bool;

    /// Check whether a directory exists at `path`
    fn directory_exists(&self, path: &Path) -> bool;

    /// List the names of the immediate subdirectories of `path`
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>, ListDirError>;
}

// ============================================================================
// OS-backed implementation
// ============================================================================

/// The std-backed filesystem used by the binary
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>, ListDirError> {
        let entries = fs::read_dir(path).map_err(|source| ListDirError {
            path: path.to_path_buf(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ListDirError {
                path: path.to_path_buf(),
                source,
            })?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                // Skip names that are not valid UTF-8; route segments are
                // always UTF-8 so such directories can never match anyway.
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }

        Ok(names)
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// An in-memory file tree
///
/// Used by tests and by hosts that supply their own view of the project
/// (e.g. unsaved editor buffers). Registering a file implies all of its
/// parent directories. Listing order is deterministic (lexicographic).
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: BTreeSet<PathBuf>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file, creating every ancestor directory
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.directories.insert(ancestor.to_path_buf());
            }
        }
        self.files.insert(path);
    }

    /// Register an empty directory, creating every ancestor directory
    pub fn add_directory(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                self.directories.insert(ancestor.to_path_buf());
            }
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>, ListDirError> {
        let names = self
            .directories
            .iter()
            .filter(|dir| dir.parent() == Some(path))
            .filter_map(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }
}

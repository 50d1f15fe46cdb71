//! Local filesystem storage implementation
//!
//! This module provides [`LocalFileStore`], the filesystem-backed implementation of the
//! [`FileStore`] trait consumed by the upload/download use case.
//!
//! # Security Model
//!
//! - The storage root is canonicalised once at construction
//! - Logical paths are normalised lexically; `..` may never climb above the root
//! - After resolution, the real (symlink-followed) location must still sit under the root
//!
//! # Concurrency
//!
//! No locks are taken. Two writers targeting the same logical path race at the filesystem
//! level and the last write wins.

use crate::{FilesError, LogicalPath};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Raw persistence of bytes at logical paths.
///
/// Implementations carry no upload policy; they create directories, write, and resolve.
pub trait FileStore: Send + Sync {
    /// Writes `content` at `path`, creating parent directories and overwriting any existing
    /// file.
    fn store(&self, content: &[u8], path: &LogicalPath) -> Result<(), FilesError>;

    /// Resolves `path` and opens the file for reading.
    ///
    /// Returns `FilesError::NotFound` if nothing readable exists there and
    /// `FilesError::PathEscapesRoot` if the path resolves outside the storage root.
    fn read(&self, path: &LogicalPath) -> Result<StoredFile, FilesError>;
}

/// An opened, readable file returned by [`FileStore::read`].
#[derive(Debug)]
pub struct StoredFile {
    file: fs::File,
    path: PathBuf,
    file_name: String,
    size_bytes: u64,
}

impl StoredFile {
    /// Resolved location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final segment of the requested logical path.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Hands over the open file handle.
    pub fn into_file(self) -> fs::File {
        self.file
    }
}

/// Filesystem-backed [`FileStore`] rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    /// Canonical storage root
    root_directory: PathBuf,
}

impl LocalFileStore {
    /// Creates a store rooted at `root_directory`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if the directory does not exist, is not a
    /// directory, or cannot be canonicalised.
    pub fn new(root_directory: &Path) -> Result<Self, FilesError> {
        if !root_directory.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root_directory.display()
            )));
        }

        if !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Lexically resolves `path` under the root.
    fn resolve(&self, path: &LogicalPath) -> Result<PathBuf, FilesError> {
        let mut resolved = self.root_directory.clone();
        for segment in path.normalized_segments()? {
            resolved.push(segment);
        }
        Ok(resolved)
    }

    /// Fails unless `real` (already canonical) lies under the root.
    fn ensure_within_root(&self, real: &Path, path: &LogicalPath) -> Result<(), FilesError> {
        if real.starts_with(&self.root_directory) {
            Ok(())
        } else {
            Err(FilesError::PathEscapesRoot(path.to_string()))
        }
    }
}

impl FileStore for LocalFileStore {
    fn store(&self, content: &[u8], path: &LogicalPath) -> Result<(), FilesError> {
        let destination = self.resolve(path)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create storage directory {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;

            // A symlinked partition directory must not redirect writes elsewhere.
            let real_parent = parent.canonicalize()?;
            self.ensure_within_root(&real_parent, path)?;
        }

        if let Ok(meta) = fs::symlink_metadata(&destination) {
            if meta.file_type().is_symlink() {
                let target = destination.canonicalize()?;
                self.ensure_within_root(&target, path)?;
            }
        }

        fs::write(&destination, content).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write file to {}: {}", destination.display(), e),
            ))
        })?;

        Ok(())
    }

    fn read(&self, path: &LogicalPath) -> Result<StoredFile, FilesError> {
        let resolved = self.resolve(path)?;

        let real = match resolved.canonicalize() {
            Ok(real) => real,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FilesError::NotFound(path.to_string()));
            }
            Err(e) => {
                return Err(FilesError::NotFound(format!("{}: {}", path, e)));
            }
        };
        self.ensure_within_root(&real, path)?;

        let metadata = fs::metadata(&real)?;
        if !metadata.is_file() {
            return Err(FilesError::NotFound(path.to_string()));
        }

        let file = fs::File::open(&real)
            .map_err(|e| FilesError::NotFound(format!("{}: {}", path, e)))?;

        let file_name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FilesError::InvalidPath(path.to_string()))?;

        Ok(StoredFile {
            file,
            path: real,
            file_name,
            size_bytes: metadata.len(),
        })
    }
}

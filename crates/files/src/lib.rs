//! filedrop file storage
//!
//! This crate provides raw persistence and retrieval of uploaded bytes under a single storage
//! root. It holds no upload policy: size and type checks belong to `filedrop-core`.
//!
//! ## Storage Layout
//!
//! Files are addressed by a [`LogicalPath`] of the form `/{YYYYMMDD}/{name}`:
//!
//! ```text
//! <storage_root>/
//! └── 20240101/
//!     ├── cat.png
//!     └── report.pdf
//! ```
//!
//! Writing to an existing logical path overwrites it. Every path is resolved lexically and
//! then checked against the canonical storage root, so `..` segments and symlinks cannot reach
//! files outside the root.
//!
//! ## Example Usage
//!
//! ```no_run
//! use filedrop_files::{FileStore, LocalFileStore, LogicalPath};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalFileStore::new(Path::new("storage"))?;
//! let path = LogicalPath::parse("/20240101/cat.png")?;
//! let stored = store.read(&path)?;
//! println!("{} ({} bytes)", stored.file_name(), stored.size_bytes());
//! # Ok(())
//! # }
//! ```

mod files;
mod logical_path;

pub use files::{FileStore, LocalFileStore, StoredFile};
pub use logical_path::LogicalPath;

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Logical path is malformed (empty, NUL bytes, backslashes, or names the root itself)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Logical path resolves outside the storage root
    #[error("Path escapes storage root: {0}")]
    PathEscapesRoot(String),

    /// Nothing readable exists at the logical path
    #[error("File not found or is not readable: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

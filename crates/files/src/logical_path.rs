//! Logical paths: the opaque keys callers use to store and fetch files.

use crate::FilesError;
use chrono::NaiveDate;
use filedrop_types::FileName;

/// Date format of the partition directory (`20240101`).
const DATE_PARTITION_FORMAT: &str = "%Y%m%d";

/// Opaque key identifying a stored file, rooted under the storage directory.
///
/// Paths produced by [`LogicalPath::dated`] always look like `/{YYYYMMDD}/{name}`. Paths
/// received from clients go through [`LogicalPath::parse`], which only rejects obviously
/// malformed input; containment within the root is checked when the path is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalPath(String);

impl LogicalPath {
    /// Builds the logical path for `name` stored on `date`.
    pub fn dated(date: NaiveDate, name: &FileName) -> Self {
        Self(format!("/{}/{}", date.format(DATE_PARTITION_FORMAT), name))
    }

    /// Accepts a client-supplied logical path.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if the input is blank or contains NUL bytes.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, FilesError> {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            return Err(FilesError::InvalidPath("path cannot be empty".into()));
        }
        if raw.contains('\0') {
            return Err(FilesError::InvalidPath(
                "path must not contain NUL bytes".into(),
            ));
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Collapses `.` and `..` segments and returns what is left.
    ///
    /// # Errors
    ///
    /// - `FilesError::PathEscapesRoot` if a `..` would climb above the root
    /// - `FilesError::InvalidPath` if a segment contains a backslash, or nothing remains
    pub(crate) fn normalized_segments(&self) -> Result<Vec<&str>, FilesError> {
        let mut segments: Vec<&str> = Vec::new();

        for segment in self.0.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(FilesError::PathEscapesRoot(self.0.clone()));
                    }
                }
                s if s.contains('\\') => {
                    return Err(FilesError::InvalidPath(format!(
                        "backslash in path segment: {}",
                        self.0
                    )));
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(FilesError::InvalidPath(format!(
                "path does not name a file: {}",
                self.0
            )));
        }

        Ok(segments)
    }
}

impl std::fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

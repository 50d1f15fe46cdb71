//! Defaults used when the environment leaves a setting unset.

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// Default upload size limit in KB.
pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 1000;

/// Default MIME type allow-list: images and PDF.
pub const DEFAULT_ALLOWED_FILE_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Bytes per KB in the size policy.
pub const BYTES_PER_KB: u64 = 1024;

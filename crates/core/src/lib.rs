//! # filedrop Core
//!
//! The upload/download use case for the filedrop file-storage service.
//!
//! This crate contains the business rules:
//! - Storage policy (size limit, MIME type allow-list) and its startup configuration
//! - Upload validation in a fixed, deterministic order
//! - Date-partitioned logical paths (`/{YYYYMMDD}/{name}`)
//!
//! **No transport concerns**: HTTP routing and status-code mapping belong in `api-rest`.
//! Raw filesystem access lives behind the `FileStore` trait in `filedrop-files`.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod service;
pub mod validation;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{CoreConfig, StoragePolicy};
pub use constants::DEFAULT_STORAGE_DIR;
pub use error::{FileManagementError, FileManagementResult};
pub use filedrop_files::{FileStore, FilesError, LocalFileStore, LogicalPath, StoredFile};
pub use filedrop_types::{FileName, NonEmptyText};
pub use service::FileManagementService;

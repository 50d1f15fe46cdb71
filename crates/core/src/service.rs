//! File management use case.
//!
//! [`FileManagementService`] validates uploads against the configured [`StoragePolicy`],
//! derives the date-partitioned logical path and delegates bytes to a [`FileStore`]. It holds
//! no mutable state, so one instance can serve every request concurrently.

use crate::clock::{Clock, LocalClock};
use crate::config::{CoreConfig, StoragePolicy};
use crate::validation::validate_upload;
use crate::{FileManagementError, FileManagementResult};
use filedrop_files::{FileStore, FilesError, LocalFileStore, LogicalPath, StoredFile};
use filedrop_types::FileName;
use std::sync::Arc;

/// Upload/download orchestration over a [`FileStore`].
pub struct FileManagementService<S = LocalFileStore> {
    cfg: Arc<CoreConfig>,
    store: S,
    clock: Box<dyn Clock>,
}

impl FileManagementService<LocalFileStore> {
    /// Builds the service over a [`LocalFileStore`] at the configured storage directory,
    /// creating the directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the directory cannot be created or opened as a store root.
    pub fn from_config(cfg: Arc<CoreConfig>) -> FileManagementResult<Self> {
        let storage_dir = cfg.storage_dir();
        if !storage_dir.exists() {
            tracing::info!("creating storage directory {}", storage_dir.display());
            std::fs::create_dir_all(storage_dir)
                .map_err(|e| FileManagementError::StorageFailure(FilesError::Io(e)))?;
        }

        let store =
            LocalFileStore::new(storage_dir).map_err(FileManagementError::StorageFailure)?;
        Ok(Self::new(cfg, store))
    }
}

impl<S: FileStore> FileManagementService<S> {
    /// Creates the service over `store`, dating uploads with the local clock.
    pub fn new(cfg: Arc<CoreConfig>, store: S) -> Self {
        Self {
            cfg,
            store,
            clock: Box::new(LocalClock),
        }
    }

    /// Replaces the clock used to pick the date partition.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn policy(&self) -> &StoragePolicy {
        self.cfg.policy()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Validates and stores an upload, returning its logical path `/{YYYYMMDD}/{name}`.
    ///
    /// Validation order: empty, size, declared type, then the file name. Directory
    /// components in `original_name` are dropped.
    ///
    /// # Errors
    ///
    /// - `EmptyFile`, `FileTooLarge`, `UnsupportedType` per the storage policy
    /// - `InvalidFileName` if nothing usable remains of `original_name`
    /// - `StorageFailure` if the store cannot persist the bytes
    pub fn upload_file(
        &self,
        content: &[u8],
        original_name: &str,
        declared_mime_type: &str,
        size: u64,
    ) -> FileManagementResult<LogicalPath> {
        if let Err(e) = validate_upload(self.policy(), content, declared_mime_type, size) {
            tracing::warn!("rejected upload of '{}': {}", original_name, e);
            return Err(e);
        }

        let name = FileName::from_client_name(original_name).map_err(|e| {
            tracing::warn!("rejected upload file name '{}': {}", original_name, e);
            FileManagementError::InvalidFileName(e)
        })?;

        let logical_path = LogicalPath::dated(self.clock.today(), &name);

        self.store.store(content, &logical_path).map_err(|e| {
            tracing::error!("failed to store {}: {:?}", logical_path, e);
            FileManagementError::StorageFailure(e)
        })?;

        tracing::info!(
            "stored {} ({} bytes, {})",
            logical_path,
            size,
            declared_mime_type
        );
        Ok(logical_path)
    }

    /// Resolves a logical path previously returned by [`Self::upload_file`].
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if nothing readable exists at the path
    /// - `InvalidPath` if the path is malformed or resolves outside the storage root
    /// - `StorageFailure` for other I/O faults
    pub fn download_file(&self, logical_path: &str) -> FileManagementResult<StoredFile> {
        let path = LogicalPath::parse(logical_path).map_err(map_read_error)?;
        self.store.read(&path).map_err(|e| {
            if matches!(e, FilesError::PathEscapesRoot(_)) {
                tracing::warn!("rejected download outside storage root: {}", logical_path);
            }
            map_read_error(e)
        })
    }
}

fn map_read_error(e: FilesError) -> FileManagementError {
    match e {
        FilesError::NotFound(path) => FileManagementError::FileNotFound(path),
        FilesError::InvalidPath(msg) | FilesError::PathEscapesRoot(msg) => {
            FileManagementError::InvalidPath(msg)
        }
        other => FileManagementError::StorageFailure(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use filedrop_types::NonEmptyText;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn new_year() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn service(temp: &TempDir) -> FileManagementService {
        let cfg = CoreConfig::new(temp.path().join("storage"), StoragePolicy::default()).unwrap();
        FileManagementService::from_config(Arc::new(cfg))
            .unwrap()
            .with_clock(new_year())
    }

    struct BrokenStore;

    impl FileStore for BrokenStore {
        fn store(&self, _content: &[u8], _path: &LogicalPath) -> Result<(), FilesError> {
            Err(FilesError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            )))
        }

        fn read(&self, _path: &LogicalPath) -> Result<StoredFile, FilesError> {
            Err(FilesError::Io(std::io::Error::other("disk on fire")))
        }
    }

    #[test]
    fn upload_then_download_roundtrip() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let content = vec![7u8; 500 * 1024];

        let path = service
            .upload_file(&content, "cat.png", "image/png", content.len() as u64)
            .unwrap();
        assert_eq!(path.as_str(), "/20240101/cat.png");
        assert!(temp.path().join("storage/20240101/cat.png").is_file());

        let stored = service.download_file(path.as_str()).unwrap();
        assert_eq!(stored.file_name(), "cat.png");
        assert_eq!(stored.size_bytes(), content.len() as u64);

        let mut downloaded = Vec::new();
        stored.into_file().read_to_end(&mut downloaded).unwrap();
        assert_eq!(downloaded, content);
    }

    #[test]
    fn from_config_creates_missing_storage_dir() {
        let temp = TempDir::new().unwrap();
        let _service = service(&temp);
        assert!(temp.path().join("storage").is_dir());
    }

    #[test]
    fn empty_upload_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = service(&temp).upload_file(b"", "cat.png", "image/png", 0);
        assert!(matches!(result, Err(FileManagementError::EmptyFile)));
    }

    #[test]
    fn oversize_upload_is_rejected() {
        let temp = TempDir::new().unwrap();
        let content = vec![0u8; 2000 * 1024];
        let result =
            service(&temp).upload_file(&content, "big.png", "image/png", content.len() as u64);
        assert!(matches!(
            result,
            Err(FileManagementError::FileTooLarge { max_size_kb: 1000 })
        ));
    }

    #[test]
    fn text_upload_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = service(&temp).upload_file(b"hello", "notes.txt", "text/plain", 5);
        assert!(matches!(
            result,
            Err(FileManagementError::UnsupportedType { .. })
        ));
        assert!(!temp.path().join("storage/20240101").exists());
    }

    #[test]
    fn client_directories_are_stripped_from_name() {
        let temp = TempDir::new().unwrap();
        let path = service(&temp)
            .upload_file(b"%PDF", "../../etc/report.pdf", "application/pdf", 4)
            .unwrap();
        assert_eq!(path.as_str(), "/20240101/report.pdf");
    }

    #[test]
    fn unusable_name_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = service(&temp).upload_file(b"x", "uploads/..", "image/png", 1);
        assert!(matches!(
            result,
            Err(FileManagementError::InvalidFileName(_))
        ));
    }

    #[test]
    fn storage_failure_wraps_cause() {
        let cfg = Arc::new(
            CoreConfig::new(PathBuf::from("unused"), StoragePolicy::default()).unwrap(),
        );
        let service = FileManagementService::new(cfg, BrokenStore).with_clock(new_year());

        let err = service
            .upload_file(b"x", "cat.png", "image/png", 1)
            .unwrap_err();

        assert_eq!(err.to_string(), "An error occurred while saving the file.");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("read-only filesystem"));
    }

    #[test]
    fn download_io_fault_is_storage_failure() {
        let cfg = Arc::new(
            CoreConfig::new(PathBuf::from("unused"), StoragePolicy::default()).unwrap(),
        );
        let service = FileManagementService::new(cfg, BrokenStore);
        assert!(matches!(
            service.download_file("/20240101/cat.png"),
            Err(FileManagementError::StorageFailure(_))
        ));
    }

    #[test]
    fn download_of_unknown_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            service(&temp).download_file("/20240101/ghost.png"),
            Err(FileManagementError::FileNotFound(_))
        ));
    }

    #[test]
    fn download_outside_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        std::fs::write(temp.path().join("secret.txt"), b"top secret").unwrap();

        for raw in ["/../secret.txt", "/20240101/../../secret.txt", ""] {
            assert!(
                matches!(
                    service.download_file(raw),
                    Err(FileManagementError::InvalidPath(_))
                ),
                "expected rejection for {raw:?}"
            );
        }
    }

    #[test]
    fn policy_changes_do_not_affect_stored_files() {
        let temp = TempDir::new().unwrap();
        let first = service(&temp);
        let path = first.upload_file(b"png", "cat.png", "image/png", 3).unwrap();

        let strict = StoragePolicy::new(1, vec![NonEmptyText::new("application/pdf").unwrap()])
            .unwrap();
        let cfg = CoreConfig::new(temp.path().join("storage"), strict).unwrap();
        let second = FileManagementService::from_config(Arc::new(cfg)).unwrap();

        assert!(second.download_file(path.as_str()).is_ok());
    }
}

use filedrop_files::FilesError;
use filedrop_types::FileNameError;

/// Failures of the upload/download use case.
///
/// Each failure is scoped to one request. Mapping to transport status codes is the caller's
/// job.
#[derive(Debug, thiserror::Error)]
pub enum FileManagementError {
    #[error("File is empty. Please select a file to upload.")]
    EmptyFile,
    #[error("File size exceeds the maximum limit of {max_size_kb}KB.")]
    FileTooLarge { max_size_kb: u64 },
    #[error("Only the following file types are allowed: [{}].", .allowed.join(", "))]
    UnsupportedType {
        declared: String,
        allowed: Vec<String>,
    },
    #[error("Invalid file name: {0}")]
    InvalidFileName(#[from] FileNameError),
    #[error("Invalid file path: {0}")]
    InvalidPath(String),
    #[error("File not found or is not readable: {0}")]
    FileNotFound(String),
    #[error("An error occurred while saving the file.")]
    StorageFailure(#[source] FilesError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type FileManagementResult<T> = std::result::Result<T, FileManagementError>;

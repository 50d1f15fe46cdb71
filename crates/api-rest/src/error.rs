//! Mapping of use-case failures to HTTP responses.
//!
//! Every error becomes a plain-text body with the status code below. This is the only place
//! status codes are chosen.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use filedrop_core::FileManagementError;

#[derive(Debug)]
pub enum ApiError {
    /// A typed failure from the file management use case
    Files(FileManagementError),
    /// The request body is not usable multipart data
    Multipart(String),
    /// Anything else going wrong while serving the request
    Internal(&'static str),
}

impl From<FileManagementError> for ApiError {
    fn from(err: FileManagementError) -> Self {
        Self::Files(err)
    }
}

/// Status code for each use-case failure.
pub fn status_for(err: &FileManagementError) -> StatusCode {
    match err {
        FileManagementError::EmptyFile
        | FileManagementError::InvalidFileName(_)
        | FileManagementError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        FileManagementError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        FileManagementError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        FileManagementError::FileNotFound(_) => StatusCode::NOT_FOUND,
        FileManagementError::StorageFailure(_) | FileManagementError::InvalidConfig(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Files(err) => (status_for(&err), err.to_string()).into_response(),
            ApiError::Multipart(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

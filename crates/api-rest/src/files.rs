//! Upload and download endpoints.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use filedrop_core::{FileManagementError, StoragePolicy};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::AppState;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Multipart form accepted by `POST /api/upload`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// The file to store
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Logical path returned by the upload endpoint, e.g. `/20240101/cat.png`
    pub filepath: String,
}

/// The `file` field as received from the client.
struct FilePart {
    file_name: String,
    content_type: String,
    content: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored; body carries the file_url", body = String, content_type = "text/plain"),
        (status = 400, description = "Empty file, invalid file name or malformed multipart body"),
        (status = 413, description = "File exceeds the configured size limit"),
        (status = 415, description = "File type is not in the allow-list"),
        (status = 500, description = "File could not be saved")
    )
)]
/// Upload a file
///
/// Only the configured file types are accepted and the file must not exceed the configured
/// size limit. The response carries the logical path to use for downloads.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    let part = read_file_part(&mut multipart, state.files.policy())
        .await?
        .ok_or(FileManagementError::EmptyFile)?;

    let files = state.files.clone();
    let logical_path = tokio::task::spawn_blocking(move || {
        let size = part.content.len() as u64;
        files.upload_file(&part.content, &part.file_name, &part.content_type, size)
    })
    .await
    .map_err(|e| {
        tracing::error!("upload task failed: {:?}", e);
        ApiError::Internal("An error occurred while saving the file.")
    })??;

    Ok(format!(
        "File uploaded successfully, and file_url: {}",
        logical_path
    ))
}

#[utoipa::path(
    get,
    path = "/api/download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File content as an attachment"),
        (status = 400, description = "Malformed path or path outside the storage root"),
        (status = 404, description = "No readable file at the given path"),
        (status = 500, description = "File could not be read")
    )
)]
/// Download a file
///
/// Serves the file stored at `filepath` with a content type guessed from its extension and a
/// UTF-8 encoded `Content-Disposition` filename.
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let files = state.files.clone();
    let stored = tokio::task::spawn_blocking(move || files.download_file(&query.filepath))
        .await
        .map_err(|e| {
            tracing::error!("download task failed: {:?}", e);
            ApiError::Internal("An error occurred while reading the file.")
        })?
        .map_err(|e| match e {
            FileManagementError::StorageFailure(cause) => {
                tracing::error!("download failed: {:?}", cause);
                ApiError::Internal("An error occurred while reading the file.")
            }
            other => ApiError::Files(other),
        })?;

    let content_type = mime_guess::from_path(stored.file_name()).first_or_octet_stream();
    let content_type = HeaderValue::from_str(content_type.as_ref())
        .map_err(|_| ApiError::Internal("An error occurred while reading the file."))?;
    let disposition = HeaderValue::from_str(&content_disposition(stored.file_name()))
        .map_err(|_| ApiError::Internal("An error occurred while reading the file."))?;
    let content_length = HeaderValue::from(stored.size_bytes());

    tracing::debug!("serving {}", stored.path().display());
    let file = tokio::fs::File::from_std(stored.into_file());
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, content_length),
        ],
        body,
    )
        .into_response())
}

/// `attachment; filename*=UTF-8''{name}` with the name form-urlencoded and spaces as `%20`.
pub fn content_disposition(file_name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(file_name.as_bytes()).collect();
    format!(
        "attachment; filename*=UTF-8''{}",
        encoded.replace('+', "%20")
    )
}

/// Pulls the `file` field out of the form, skipping any others.
///
/// Returns `Ok(None)` when the form has no `file` field.
async fn read_file_part(
    multipart: &mut Multipart,
    policy: &StoragePolicy,
) -> Result<Option<FilePart>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, policy))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, policy))?;

        return Ok(Some(FilePart {
            file_name,
            content_type,
            content: content.to_vec(),
        }));
    }

    Ok(None)
}

/// Bodies cut off by the transport limit are reported like any other oversize file.
fn multipart_error(err: MultipartError, policy: &StoragePolicy) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("upload exceeded request body limit");
        return ApiError::Files(FileManagementError::FileTooLarge {
            max_size_kb: policy.max_file_size_kb(),
        });
    }
    tracing::warn!("malformed multipart upload: {}", err.body_text());
    ApiError::Multipart(err.body_text())
}

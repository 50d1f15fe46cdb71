//! # API REST
//!
//! REST API implementation for filedrop.
//!
//! Handles:
//! - HTTP endpoints with axum (`/api/upload`, `/api/download`, `/health`)
//! - OpenAPI/Swagger documentation
//! - Mapping of use-case failures to status codes
//!
//! Uses `filedrop-core` for all validation and storage decisions.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod files;
pub mod health;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use filedrop_core::{FileManagementService, StoragePolicy};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;
pub use health::{HealthRes, HealthService};

/// Room above the size policy for multipart boundaries, part headers and any extra fields.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FileManagementService>,
}

impl AppState {
    pub fn new(files: FileManagementService) -> Self {
        Self {
            files: Arc::new(files),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, files::upload_file, files::download_file),
    components(schemas(HealthRes, files::UploadForm))
)]
pub struct ApiDoc;

/// Builds the application router with all routes, docs and layers.
///
/// The request body limit is derived from the storage policy so that files slightly over the
/// limit still reach the use case and get its error message.
pub fn router(state: AppState) -> Router {
    let body_limit = upload_body_limit(state.files.policy());

    Router::new()
        .route("/health", get(health))
        .route("/api/upload", post(files::upload_file))
        .route("/api/download", get(files::download_file))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn upload_body_limit(policy: &StoragePolicy) -> usize {
    let limit = policy
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use filedrop_core::{config::core_config_from_env_values, FileManagementService};

/// Main entry point for the filedrop service
///
/// Resolves configuration once from the environment (and an optional `.env` file), then serves
/// the REST API until the process is stopped.
///
/// # Environment Variables
/// - `FILEDROP_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `STORAGE_DIR`: Storage root, created if missing (default: "storage")
/// - `MAX_FILE_SIZE_KB`: Upload size limit in KB (default: 1000)
/// - `ALLOWED_FILE_TYPES`: Comma-separated MIME types (default: "image/jpeg,image/png,application/pdf")
/// - `VERIFY_CONTENT_TYPE`: Check uploads' magic bytes against the declared type (default: false)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the storage directory cannot be created or opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("filedrop=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("FILEDROP_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env_values(
        std::env::var("STORAGE_DIR").ok(),
        std::env::var("MAX_FILE_SIZE_KB").ok(),
        std::env::var("ALLOWED_FILE_TYPES").ok(),
        std::env::var("VERIFY_CONTENT_TYPE").ok(),
    )?);

    tracing::info!(
        "++ Storage root {}, max {}KB, allowed [{}]",
        cfg.storage_dir().display(),
        cfg.policy().max_file_size_kb(),
        cfg.policy()
            .allowed_types()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let files = FileManagementService::from_config(cfg)?;
    let app = api_rest::router(AppState::new(files));

    tracing::info!("++ Starting filedrop REST on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

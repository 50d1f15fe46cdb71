use clap::{Args, Parser, Subcommand};
use filedrop_core::{config::core_config_from_env_values, FileManagementService};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "filedrop")]
#[command(about = "Store and fetch files in a filedrop storage root without the HTTP server")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Same settings the server reads, with the same environment variables.
#[derive(Args)]
struct Settings {
    /// Storage root directory
    #[arg(long, global = true, env = "STORAGE_DIR")]
    storage_dir: Option<String>,
    /// Maximum file size in KB
    #[arg(long, global = true, env = "MAX_FILE_SIZE_KB")]
    max_file_size_kb: Option<String>,
    /// Comma-separated allowed MIME types
    #[arg(long, global = true, env = "ALLOWED_FILE_TYPES")]
    allowed_file_types: Option<String>,
    /// Check content magic bytes against the declared type
    #[arg(long, global = true, env = "VERIFY_CONTENT_TYPE")]
    verify_content_type: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and store a local file
    Upload {
        /// File to upload
        path: PathBuf,
        /// Declared MIME type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Copy a stored file out of the storage root
    Download {
        /// Logical path returned by upload, e.g. /20240101/cat.png
        filepath: String,
        /// Destination file (defaults to the stored file name in the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the active storage policy
    Policy,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = core_config_from_env_values(
        cli.settings.storage_dir,
        cli.settings.max_file_size_kb,
        cli.settings.allowed_file_types,
        cli.settings.verify_content_type,
    )?;

    match cli.command {
        Some(Commands::Upload { path, content_type }) => {
            let service = FileManagementService::from_config(Arc::new(cfg))?;
            let content = std::fs::read(&path)?;
            let content_type = content_type
                .unwrap_or_else(|| mime_guess::from_path(&path).first_or_octet_stream().to_string());
            let original_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match service.upload_file(
                &content,
                &original_name,
                &content_type,
                content.len() as u64,
            ) {
                Ok(logical_path) => println!("Stored file_url: {}", logical_path),
                Err(e) => eprintln!("Error uploading {}: {}", path.display(), e),
            }
        }
        Some(Commands::Download { filepath, output }) => {
            let service = FileManagementService::from_config(Arc::new(cfg))?;
            match service.download_file(&filepath) {
                Ok(stored) => {
                    let destination =
                        output.unwrap_or_else(|| PathBuf::from(stored.file_name()));
                    let mut source = stored.into_file();
                    let mut target = std::fs::File::create(&destination)?;
                    let copied = io::copy(&mut source, &mut target)?;
                    println!("Wrote {} bytes to {}", copied, destination.display());
                }
                Err(e) => eprintln!("Error downloading {}: {}", filepath, e),
            }
        }
        Some(Commands::Policy) => {
            let policy = cfg.policy();
            println!("Storage root: {}", cfg.storage_dir().display());
            println!("Max file size: {}KB", policy.max_file_size_kb());
            for mime in policy.allowed_types() {
                println!("Allowed: {}", mime);
            }
            println!("Verify content type: {}", policy.verify_content_type());
        }
        None => {
            println!("Use 'filedrop --help' for commands");
        }
    }

    Ok(())
}

//! Pinmark CLI: validate a bookmark export or import it for a user.
//!
//! Reads configuration from the environment (or `.env`). `import` needs
//! DATABASE_URL and a storage backend; `validate` needs neither.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pinmark_core::models::{DuplicateStrategy, ImportOptions, ImportSource};
use pinmark_core::ImportConfig;
use pinmark_db::{setup_database, BookmarkRepository};
use pinmark_import::{ImportState, InMemoryJobStatusStore};
use pinmark_infra::{init_telemetry, LogFormat};
use pinmark_storage::create_storage;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pinmark", about = "Bookmark import CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file parses as the given (or detected) format
    Validate {
        /// Format: native, json, csv, chrome, netscape. Detected when omitted
        #[arg(long)]
        source: Option<ImportSource>,
        /// Path to the export file
        file: PathBuf,
    },
    /// Import a file into a user's bookmarks
    Import {
        /// Owner of the imported bookmarks
        #[arg(long)]
        user: Uuid,
        /// Format: native, json, csv, chrome, netscape. Detected when omitted
        #[arg(long)]
        source: Option<ImportSource>,
        /// skip, update or create_duplicate
        #[arg(long, default_value = "skip")]
        strategy: DuplicateStrategy,
        /// Category name assigned to created bookmarks
        #[arg(long)]
        default_category: Option<String>,
        /// Resolve every record without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Path to the export file
        file: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ImportConfig::from_env()?;
    let format = config.log_format.parse::<LogFormat>().unwrap_or_else(|err| {
        eprintln!("{}, falling back to pretty logs", err);
        LogFormat::Pretty
    });
    if let Err(err) = init_telemetry(format) {
        eprintln!("Failed to initialize tracing: {}", err);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { source, file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let source = pinmark_cli::resolve_source(source, &content);
            let result = pinmark_import::formats::validate(source, &content);
            print_json(&result)?;
        }
        Commands::Import {
            user,
            source,
            strategy,
            default_category,
            dry_run,
            file,
        } => {
            config.validate()?;

            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let source = pinmark_cli::resolve_source(source, &content);
            let mut options = ImportOptions::new(source)
                .with_strategy(strategy)
                .dry_run(dry_run);
            if let Some(category) = default_category {
                options = options.with_default_category(category);
            }

            let pool = setup_database(&config).await?;
            let repository = BookmarkRepository::new(pool);
            let storage = create_storage(&config)
                .await
                .context("Failed to initialize storage backend")?;
            let statuses = InMemoryJobStatusStore::new(
                chrono::Duration::seconds(config.status_ttl_secs),
                config.history_limit,
            );
            let state = Arc::new(ImportState::new(
                &config,
                storage,
                Arc::new(repository.clone()),
                Arc::new(statuses),
            ));

            let status = pinmark_cli::run_import(state, user, &file, options).await?;
            print_json(&status)?;

            let total = repository.count_for_user(user).await?;
            tracing::info!(user_id = %user, total_bookmarks = total, "Import finished");
        }
    }

    Ok(())
}

//! CLI command definitions and dispatch.

pub mod detail;
pub mod directory;
pub mod health;
pub mod relocate;
pub mod upload;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use uuid::Uuid;

use crate::output::OutputFormat;
use treehub_cache::{CacheManager, ImageCacheService};
use treehub_core::config::AppConfig;
use treehub_core::error::AppError;
use treehub_database::DatabasePool;
use treehub_database::migration::run_migrations;
use treehub_entity::matter::Matter;
use treehub_entity::user::User;
use treehub_service::MatterService;
use treehub_storage::{HttpFetcher, LocalStorageProvider};

/// TreeHub: multi-user virtual file trees
#[derive(Debug, Parser)]
#[command(name = "treehub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,

    /// Configuration environment overlay to apply
    #[arg(long, env = "TREEHUB_ENV", default_value = "development", global = true)]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Acting user
    #[command(flatten)]
    pub user: UserArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Identity of the acting user. Users are managed outside TreeHub.
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User ID
    #[arg(long, env = "TREEHUB_USER_ID", global = true)]
    pub user_id: Option<Uuid>,

    /// Username; selects the user's storage root
    #[arg(long, env = "TREEHUB_USERNAME", global = true)]
    pub username: Option<String>,

    /// Per-upload size limit in bytes (negative for unlimited)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true, global = true)]
    pub size_limit: i64,
}

impl UserArgs {
    /// Build the acting user, failing if the identity is incomplete.
    pub fn user(&self) -> Result<User, AppError> {
        match (self.user_id, &self.username) {
            (Some(id), Some(name)) if !name.trim().is_empty() => {
                Ok(User::new(id, name.trim(), self.size_limit))
            }
            _ => Err(AppError::validation(
                "--user-id and --username are required for this command",
            )),
        }
    }
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a directory
    Mkdir(directory::MkdirArgs),
    /// List a directory
    Ls(directory::LsArgs),
    /// Upload a local file
    Upload(upload::UploadArgs),
    /// Fetch a remote URL into the tree
    Crawl(upload::CrawlArgs),
    /// Move matters into a directory
    Mv(relocate::MoveArgs),
    /// Copy a matter into a directory
    Cp(relocate::CopyArgs),
    /// Rename a matter in place
    Rename(relocate::RenameArgs),
    /// Delete a matter and everything below it
    Rm(relocate::RemoveArgs),
    /// Show a matter with its ancestors
    Detail(detail::DetailArgs),
    /// Check database, storage and cache connectivity
    Health,
}

/// Everything a matter command needs.
pub struct Context {
    /// The tree mutation engine.
    pub service: MatterService,
    /// The acting user.
    pub user: User,
    /// Selected output format.
    pub format: OutputFormat,
}

impl Cli {
    /// Load configuration from the configured directory and environment.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Health = &self.command {
            return health::execute(&config, self.format).await;
        }

        let ctx = Context {
            service: build_service(&config).await?,
            user: self.user.user()?,
            format: self.format,
        };

        match &self.command {
            Commands::Mkdir(args) => directory::mkdir(args, &ctx).await,
            Commands::Ls(args) => directory::ls(args, &ctx).await,
            Commands::Upload(args) => upload::upload(args, &ctx).await,
            Commands::Crawl(args) => upload::crawl(args, &ctx).await,
            Commands::Mv(args) => relocate::mv(args, &ctx).await,
            Commands::Cp(args) => relocate::cp(args, &ctx).await,
            Commands::Rename(args) => relocate::rename(args, &ctx).await,
            Commands::Rm(args) => relocate::rm(args, &ctx).await,
            Commands::Detail(args) => detail::execute(args, &ctx).await,
            Commands::Health => Ok(()),
        }
    }
}

impl Context {
    /// Resolve a virtual path of the acting user.
    pub async fn resolve(&self, path: &str) -> Result<Matter, AppError> {
        self.service.find_by_path(&self.user, path).await
    }
}

/// Wire the repository, storage, cache and fetcher into a matter service.
pub async fn build_service(config: &AppConfig) -> Result<MatterService, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;

    let storage = LocalStorageProvider::new(&config.storage.matter_root).await?;
    let images = ImageCacheService::new(CacheManager::new(&config.cache)?);
    let fetcher = HttpFetcher::new(&config.crawl)?;
    debug!(
        matter_root = %config.storage.matter_root,
        cache = %config.cache.provider,
        "Matter service wired"
    );

    Ok(MatterService::new(
        Arc::new(pool.matters()),
        Arc::new(storage),
        Arc::new(images),
        Arc::new(fetcher),
        &config.storage,
    ))
}

/// Split `/a/b/c` into (`/a/b`, `c`). The parent of a top-level path is `/`.
pub fn split_parent(path: &str) -> Result<(&str, &str), AppError> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) if idx + 1 < trimmed.len() => {
            let parent = if idx == 0 { "/" } else { &trimmed[..idx] };
            Ok((parent, &trimmed[idx + 1..]))
        }
        _ => Err(AppError::validation(format!(
            "'{path}' must be an absolute path below '/'"
        ))),
    }
}

//! Upload and crawl CLI commands.

use std::path::PathBuf;

use clap::Args;
use tokio_util::io::ReaderStream;

use super::Context;
use crate::output;
use treehub_core::error::{AppError, ErrorKind};
use treehub_core::traits::ByteStream;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the local file to upload
    pub file: PathBuf,

    /// Target directory
    #[arg(short, long, default_value = "/")]
    pub dir: String,

    /// Override file name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Mark the file private
    #[arg(long)]
    pub private: bool,
}

/// Arguments for the crawl command
#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// http:// or https:// URL to fetch
    pub url: String,

    /// Name of the new file
    #[arg(short, long)]
    pub name: String,

    /// Target directory
    #[arg(short, long, default_value = "/")]
    pub dir: String,

    /// Mark the file private
    #[arg(long)]
    pub private: bool,
}

/// Execute the upload command
pub async fn upload(args: &UploadArgs, ctx: &Context) -> Result<(), AppError> {
    let file_name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::validation(format!("Cannot derive a name from {}", args.file.display()))
            })?,
    };

    let file = tokio::fs::File::open(&args.file).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::NotFound,
            format!("Cannot open {}", args.file.display()),
            e,
        )
    })?;
    let stream: ByteStream = Box::pin(ReaderStream::new(file));

    let dir = ctx.resolve(&args.dir).await?;
    let matter = ctx
        .service
        .atomic_upload(stream, &ctx.user, &dir, &file_name, args.private)
        .await?;

    output::print_matter(
        &matter,
        &format!("File '{}' uploaded ({} bytes)", matter.relative_path, matter.size),
        ctx.format,
    );
    Ok(())
}

/// Execute the crawl command
pub async fn crawl(args: &CrawlArgs, ctx: &Context) -> Result<(), AppError> {
    let dir = ctx.resolve(&args.dir).await?;
    let matter = ctx
        .service
        .atomic_crawl(&args.url, &args.name, &ctx.user, &dir, args.private)
        .await?;

    output::print_matter(
        &matter,
        &format!("Fetched '{}' into '{}'", args.url, matter.relative_path),
        ctx.format,
    );
    Ok(())
}

//! Directory CLI commands.

use clap::Args;

use super::{Context, split_parent};
use crate::output::{self, MatterRow};
use treehub_core::error::AppError;
use treehub_entity::matter::{MatterFilter, MatterKind};

/// Arguments for the mkdir command
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Absolute path of the directory to create
    pub path: String,

    /// Create missing parents and accept an existing directory
    #[arg(short, long)]
    pub parents: bool,
}

/// Arguments for the ls command
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Directory to list
    #[arg(default_value = "/")]
    pub path: String,

    /// Only list directories
    #[arg(long, conflicts_with = "files")]
    pub dirs: bool,

    /// Only list files
    #[arg(long)]
    pub files: bool,

    /// Only list names containing this text (case-insensitive)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Execute the mkdir command
pub async fn mkdir(args: &MkdirArgs, ctx: &Context) -> Result<(), AppError> {
    let dir = if args.parents {
        ctx.service
            .atomic_create_directories(&ctx.user, &args.path)
            .await?
    } else {
        let (parent, name) = split_parent(&args.path)?;
        let parent = ctx.resolve(parent).await?;
        ctx.service
            .atomic_create_directory(&parent, name, &ctx.user)
            .await?
    };

    output::print_matter(
        &dir,
        &format!("Directory '{}' ready", dir.relative_path),
        ctx.format,
    );
    Ok(())
}

/// Execute the ls command
pub async fn ls(args: &LsArgs, ctx: &Context) -> Result<(), AppError> {
    let dir = ctx.resolve(&args.path).await?;

    let kind = if args.dirs {
        MatterKind::Directory
    } else if args.files {
        MatterKind::File
    } else {
        MatterKind::Any
    };
    let filter = MatterFilter {
        kind,
        name_contains: args.name.clone(),
    };

    let children = ctx.service.list(&ctx.user, &dir, &filter).await?;
    let rows: Vec<MatterRow> = children.iter().map(MatterRow::from).collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}

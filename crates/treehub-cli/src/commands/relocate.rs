//! Move, copy, rename and delete CLI commands.

use clap::Args;

use super::Context;
use crate::output::{self, MatterRow};
use treehub_core::error::AppError;

/// Arguments for the mv command
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Matters to move
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Destination directory
    #[arg(short, long)]
    pub to: String,

    /// Replace a matter already at the destination (single source only)
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the cp command
#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Matter to copy
    pub source: String,

    /// Destination directory
    pub to: String,

    /// Name of the copy (defaults to the source name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Replace a matter already at the destination
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the rename command
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Matter to rename
    pub path: String,

    /// New name
    pub name: String,
}

/// Arguments for the rm command
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Matter to delete
    pub path: String,
}

/// Execute the mv command
pub async fn mv(args: &MoveArgs, ctx: &Context) -> Result<(), AppError> {
    let dest = ctx.resolve(&args.to).await?;

    if let [single] = args.sources.as_slice() {
        let src = ctx.resolve(single).await?;
        let moved = ctx.service.atomic_move(&src, &dest, args.overwrite).await?;
        output::print_matter(
            &moved,
            &format!("Moved '{}' to '{}'", src.relative_path, moved.relative_path),
            ctx.format,
        );
        return Ok(());
    }

    if args.overwrite {
        output::print_warning("--overwrite is ignored when moving several matters");
    }
    let mut srcs = Vec::with_capacity(args.sources.len());
    for path in &args.sources {
        srcs.push(ctx.resolve(path).await?);
    }
    let moved = ctx.service.atomic_move_batch(&srcs, &dest).await?;
    let rows: Vec<MatterRow> = moved.iter().map(MatterRow::from).collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}

/// Execute the cp command
pub async fn cp(args: &CopyArgs, ctx: &Context) -> Result<(), AppError> {
    let src = ctx.resolve(&args.source).await?;
    let dest = ctx.resolve(&args.to).await?;
    let name = args.name.as_deref().unwrap_or(&src.name);

    let copy = ctx
        .service
        .atomic_copy(&src, &dest, name, args.overwrite)
        .await?;
    output::print_matter(
        &copy,
        &format!("Copied '{}' to '{}'", src.relative_path, copy.relative_path),
        ctx.format,
    );
    Ok(())
}

/// Execute the rename command
pub async fn rename(args: &RenameArgs, ctx: &Context) -> Result<(), AppError> {
    let matter = ctx.resolve(&args.path).await?;
    let renamed = ctx
        .service
        .atomic_rename(&matter, &args.name, &ctx.user)
        .await?;
    output::print_matter(
        &renamed,
        &format!("Renamed to '{}'", renamed.relative_path),
        ctx.format,
    );
    Ok(())
}

/// Execute the rm command
pub async fn rm(args: &RemoveArgs, ctx: &Context) -> Result<(), AppError> {
    let matter = ctx.resolve(&args.path).await?;
    let removed = ctx.service.atomic_delete(&matter).await?;
    output::print_success(&format!(
        "Deleted '{}' ({} record(s))",
        matter.relative_path, removed
    ));
    Ok(())
}

//! Matter detail CLI command.

use clap::Args;
use uuid::Uuid;

use super::Context;
use crate::output;
use treehub_core::error::AppError;

/// Arguments for the detail command
#[derive(Debug, Args)]
pub struct DetailArgs {
    /// Matter ID or absolute path
    pub target: String,
}

/// Execute the detail command
pub async fn execute(args: &DetailArgs, ctx: &Context) -> Result<(), AppError> {
    let detail = match Uuid::parse_str(&args.target) {
        Ok(id) => ctx.service.detail(id).await?,
        Err(_) => {
            let matter = ctx.resolve(&args.target).await?;
            ctx.service.wrap_detail(matter).await?
        }
    };

    if detail.matter.owner_id != ctx.user.id {
        return Err(AppError::not_found(format!("Matter {} not found", args.target)));
    }

    output::print_detail(&detail, ctx.format);
    Ok(())
}

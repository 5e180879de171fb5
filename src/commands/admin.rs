use colored::Colorize;

use crate::cli::AdminCommand;
use crate::context::AppContext;
use crate::error::Result;

/// Handle `admin` subcommands
pub async fn handle_admin(ctx: &AppContext, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Pending => {
            let doctors = ctx.pending_doctors().await?;
            if doctors.is_empty() {
                println!("{}", "No doctors awaiting approval.".yellow());
            } else {
                super::patient::print_doctors(&doctors);
            }
        }
        AdminCommand::Approved => {
            let doctors = ctx.approved_doctors().await?;
            if doctors.is_empty() {
                println!("{}", "No approved doctors.".yellow());
            } else {
                super::patient::print_doctors(&doctors);
            }
        }
        AdminCommand::Approve { id } => {
            let response = ctx.approve_doctor(&id).await?;
            let message = response
                .message
                .unwrap_or_else(|| format!("Doctor {} approved", id));
            println!("{}", message.green());
        }
        AdminCommand::Reject { id } => {
            let response = ctx.reject_doctor(&id).await?;
            let message = response
                .message
                .unwrap_or_else(|| format!("Doctor {} rejected", id));
            println!("{}", message.green());
        }
        AdminCommand::ClearStore => {
            ctx.clear_store().await?;
            println!("{}", "All local data cleared.".green());
        }
    }
    Ok(())
}

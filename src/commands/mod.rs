/*!
Command handlers for the CLI

Each module handles one group of commands and stands in for the matching
screens of the mobile client:

- `auth`     login, signup, logout, whoami
- `patient`  upload, diagnosis, doctors, booking, reports
- `doctor`   appointments, confirmation, messages, profile, reports
- `admin`    doctor approvals and store maintenance
- `settings` theme preference

Handlers return errors instead of printing them; `main` is the single
place where an error is turned into a user-facing alert.
*/

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;

pub mod admin;
pub mod auth;
pub mod doctor;
pub mod patient;
pub mod settings;

/// Dispatch a parsed command line
///
/// # Arguments
///
/// * `cli` - Parsed command line
/// * `config` - Validated configuration
///
/// # Errors
///
/// Returns whatever the selected handler returns.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let ctx = AppContext::new(&config)?;

    match cli.command {
        Commands::Login { email, password } => auth::login(&ctx, email, password).await,
        Commands::Signup {
            name,
            email,
            password,
            mobile,
            birth_date,
            role,
        } => {
            let form = crate::validation::SignupForm {
                full_name: name,
                email,
                password,
                mobile_number: mobile,
                birth_date,
                role: role.into(),
            };
            auth::signup(&ctx, &form).await
        }
        Commands::Logout => auth::logout(&ctx).await,
        Commands::Whoami => auth::whoami(&ctx).await,
        Commands::Upload { image } => patient::upload(&ctx, &image).await,
        Commands::Diagnosis => patient::show_diagnosis(&ctx).await,
        Commands::Doctors { command } => patient::handle_doctors(&ctx, command).await,
        Commands::Book {
            doctor_id,
            date,
            time,
            message,
        } => {
            let form = crate::validation::BookingForm {
                doctor_id,
                date,
                time,
                message,
            };
            patient::book(&ctx, &form).await
        }
        Commands::Reports => patient::reports(&ctx).await,
        Commands::Doctor { command } => doctor::handle_doctor(&ctx, command).await,
        Commands::Admin { command } => admin::handle_admin(&ctx, command).await,
        Commands::Theme { theme } => settings::theme(&ctx, theme.map(Into::into)).await,
    }
}

/// Renders an optional field for a table cell.
pub(crate) fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Shortens text for a table cell.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

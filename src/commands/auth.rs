use colored::Colorize;

use crate::context::AppContext;
use crate::error::Result;
use crate::session::{Role, Session};
use crate::validation::{LoginForm, SignupForm};

/// Log in and greet the user
pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    let session = ctx.login(&LoginForm { email, password }).await?;
    greet(&session);
    Ok(())
}

/// Register an account and greet the user
pub async fn signup(ctx: &AppContext, form: &SignupForm) -> Result<()> {
    let session = ctx.signup(form).await?;
    println!("{}", "Account created.".green());
    greet(&session);
    if session.role == Role::Doctor {
        println!(
            "Submit your credentials with {}.",
            "dermascan doctor medical-info".cyan()
        );
    }
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.logout().await?;
    println!("{}", "Logged out.".green());
    Ok(())
}

/// Print the current session
pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.require_session().await?;
    println!("{:<10} {}", "Name:".bold(), session.display_name);
    println!("{:<10} {}", "Role:".bold(), session.role);
    println!("{:<10} {}", "User ID:".bold(), session.user_id);
    if let Some(email) = &session.email {
        println!("{:<10} {}", "Email:".bold(), email);
    }
    if let Some(patient_id) = &session.patient_id {
        println!("{:<10} {}", "Patient:".bold(), patient_id);
    }
    if session.role == Role::Doctor {
        let status = if session.approval_status {
            "approved".green()
        } else {
            "pending approval".yellow()
        };
        println!("{:<10} {}", "Status:".bold(), status);
    }
    Ok(())
}

fn greet(session: &Session) {
    let name = if session.display_name.is_empty() {
        session.user_id.as_str()
    } else {
        session.display_name.as_str()
    };
    println!("{} {} ({})", "Welcome,".green(), name.bold(), session.role);
    if session.is_pending_doctor() {
        println!(
            "{}",
            "Your account is awaiting admin approval.".yellow()
        );
    }
}

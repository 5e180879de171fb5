use colored::Colorize;

use crate::context::AppContext;
use crate::error::Result;
use crate::preferences::Theme;

/// Show the theme, or store a new one
pub async fn theme(ctx: &AppContext, theme: Option<Theme>) -> Result<()> {
    match theme {
        Some(theme) => {
            ctx.preferences().set_theme(theme).await?;
            println!("Theme set to {}", theme.to_string().bold());
        }
        None => {
            let current = ctx.preferences().theme().await?;
            println!("{}", current);
        }
    }
    Ok(())
}

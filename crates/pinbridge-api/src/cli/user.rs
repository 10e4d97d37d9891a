//! `pinbridge show <user-id>`.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Print a registered user, styled or as JSON.
pub async fn show_user(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let user = state.user_query.resolve(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&user.name).cyan().bold());
    println!();
    println!("  {}", style("── Details ──").dim());
    println!("  {}          {}", style("ID:").bold(), user.id);
    println!("  {}     {}", style("Chat ID:").bold(), user.chat_id);
    println!(
        "  {}  {}",
        style("Registered:").bold(),
        user.registered_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    Ok(())
}

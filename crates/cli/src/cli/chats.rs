//! `tripchat history` and `tripchat delete`.

use rustyline::DefaultEditor;

use tc_client::{AppState, DeleteOutcome};

use crate::terminal::error_line;

pub async fn history(app: &AppState) -> anyhow::Result<()> {
    if app.auth.token().is_none() {
        eprintln!("Sign in to see your chats.");
        return Ok(());
    }

    if let Err(e) = app.history.refresh().await {
        error_line(format!("could not fetch chats: {e}"));
    }
    let chats = app.history.chats();
    if chats.is_empty() {
        println!("No chats yet.");
        return Ok(());
    }
    for chat in chats {
        println!("{}  {:<16}  {}", chat.id, chat.timestamp_display, chat.title);
        if !chat.last_message.is_empty() {
            println!("    {}", chat.last_message);
        }
    }
    Ok(())
}

/// Ask for confirmation (unless `yes`) and delete. The dialog is always
/// closed when this returns.
pub async fn delete(
    app: &AppState,
    rl: &mut DefaultEditor,
    chat_id: &str,
    yes: bool,
) -> anyhow::Result<DeleteOutcome> {
    app.deletes.open(chat_id);

    if !yes {
        let answer = match rl.readline(&format!("Delete chat {chat_id} permanently? [y/N] ")) {
            Ok(line) => line,
            Err(e) => {
                app.deletes.cancel();
                return Err(e.into());
            }
        };
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            app.deletes.cancel();
            eprintln!("Cancelled.");
            return Ok(DeleteOutcome::NoTarget);
        }
    }

    Ok(app.deletes.confirm().await)
}

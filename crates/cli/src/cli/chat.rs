//! `tripchat chat`: interactive REPL command.
//!
//! Opens a readline-based loop that sends each line to the assistant and
//! streams the reply back. Slash commands cover sign-in, chat switching,
//! deletion and voice input.

use std::path::PathBuf;
use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use tc_client::{AppState, Conversation, DeleteOutcome, Navigator, SessionId};

use crate::cli::{account, chats, voice};
use crate::terminal::{error_line, print_transcript, TerminalNavigator, TerminalView};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slash {
    Login,
    Register,
    Guest,
    Logout,
    Whoami,
    New,
    Open(String),
    History,
    Delete(String),
    Voice(PathBuf),
    Help,
    Exit,
    /// Known command missing its argument; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

pub fn parse_slash(input: &str) -> Slash {
    let mut parts = input.trim().splitn(2, ' ');
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match (cmd, arg) {
        ("/login", _) => Slash::Login,
        ("/register", _) => Slash::Register,
        ("/guest", _) => Slash::Guest,
        ("/logout", _) => Slash::Logout,
        ("/whoami", _) => Slash::Whoami,
        ("/new", _) => Slash::New,
        ("/open", Some(id)) => Slash::Open(id.to_owned()),
        ("/open", None) => Slash::Usage("/open <chat id>"),
        ("/history", _) => Slash::History,
        ("/delete", Some(id)) => Slash::Delete(id.to_owned()),
        ("/delete", None) => Slash::Usage("/delete <chat id>"),
        ("/voice", Some(path)) => Slash::Voice(PathBuf::from(path)),
        ("/voice", None) => Slash::Usage("/voice <audio file>"),
        ("/help", _) => Slash::Help,
        ("/exit" | "/quit", _) => Slash::Exit,
        (other, _) => Slash::Unknown(other.to_owned()),
    }
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  /login             Sign in with email and password");
    eprintln!("  /register          Create an account");
    eprintln!("  /guest             Continue without an account");
    eprintln!("  /logout            Sign out");
    eprintln!("  /whoami            Show the current identity");
    eprintln!("  /new               Start a new chat");
    eprintln!("  /open <id>         Open an existing chat");
    eprintln!("  /history           List your chats");
    eprintln!("  /delete <id>       Permanently delete a chat");
    eprintln!("  /voice <file>      Transcribe a recording and send it");
    eprintln!("  /exit, /quit       Exit the chat");
    eprintln!("  /help              Show this help");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL on the chat named by `route`.
pub async fn chat(app: AppState, route: &str) -> anyhow::Result<()> {
    let navigator: Arc<dyn Navigator> = Arc::new(TerminalNavigator);

    // Readline editor with persistent input history.
    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".tripchat")
        .join("repl_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    if let Err(e) = app.history.sync_identity().await {
        tracing::debug!(error = %e, "initial chat list fetch failed");
    }

    let mut conv = Conversation::open(app.clone(), route, navigator.clone()).await;

    eprintln!("TripChat");
    eprintln!("Chat: {}  |  Type /help for commands, Ctrl+D to exit", conv.session());
    eprintln!();
    print_transcript(conv.messages());

    loop {
        let line = match rl.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                error_line(format!("readline: {e}"));
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        rl.add_history_entry(trimmed).ok();

        if !trimmed.starts_with('/') {
            send(&mut conv, trimmed).await;
            continue;
        }

        match parse_slash(trimmed) {
            Slash::Exit => break,
            Slash::Help => print_help(),
            Slash::Usage(usage) => eprintln!("Usage: {usage}"),
            Slash::Unknown(cmd) => eprintln!("Unknown command: {cmd}  (type /help for a list)"),
            Slash::Whoami => account::whoami(&app),

            Slash::Login => match account::login(&app, &mut rl).await {
                Ok(()) => identity_changed(&app).await,
                Err(e) => error_line(e),
            },
            Slash::Register => match account::register(&app, &mut rl).await {
                Ok(()) => identity_changed(&app).await,
                Err(e) => error_line(e),
            },
            Slash::Guest => {
                account::guest(&app);
                identity_changed(&app).await;
            }
            Slash::Logout => {
                account::logout(&app);
                identity_changed(&app).await;
                conv = Conversation::open(app.clone(), "new", navigator.clone()).await;
            }

            Slash::New => {
                conv = Conversation::open(app.clone(), "new", navigator.clone()).await;
                eprintln!("Started a new chat.");
            }
            Slash::Open(id) => {
                conv = Conversation::open(app.clone(), &id, navigator.clone()).await;
                eprintln!("Chat: {}", conv.session());
                print_transcript(conv.messages());
            }
            Slash::History => {
                if let Err(e) = chats::history(&app).await {
                    error_line(e);
                }
            }
            Slash::Delete(id) => match chats::delete(&app, &mut rl, &id, false).await {
                Ok(DeleteOutcome::Deleted(deleted)) => {
                    if conv.session() == &SessionId::Bound(deleted) {
                        conv = Conversation::open(app.clone(), "new", navigator.clone()).await;
                    }
                }
                Ok(_) => {}
                Err(e) => error_line(e),
            },
            Slash::Voice(path) => match voice::transcribe(&app, &path).await {
                Ok(text) => {
                    eprintln!("you (voice)> {text}");
                    send(&mut conv, &text).await;
                }
                Err(e) => error_line(e),
            },
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

/// Stream one reply to stdout.
async fn send(conv: &mut Conversation, text: &str) {
    let view = TerminalView::default();
    if let Err(e) = conv.send(text, &view).await {
        error_line(e);
        return;
    }
    // Trailing newline + blank separator after the reply.
    println!();
    println!();
}

async fn identity_changed(app: &AppState) {
    if let Err(e) = app.history.sync_identity().await {
        error_line(format!("could not refresh chats: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_parsing() {
        assert_eq!(parse_slash("/open c-1"), Slash::Open("c-1".into()));
        assert_eq!(parse_slash("/open   "), Slash::Usage("/open <chat id>"));
        assert_eq!(parse_slash("/delete  c-2 "), Slash::Delete("c-2".into()));
        assert_eq!(
            parse_slash("/voice note.wav"),
            Slash::Voice(PathBuf::from("note.wav"))
        );
        assert_eq!(parse_slash("/quit"), Slash::Exit);
        assert_eq!(parse_slash("/guest"), Slash::Guest);
        assert_eq!(parse_slash("/bogus x"), Slash::Unknown("/bogus".into()));
    }
}

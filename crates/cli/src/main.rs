use std::sync::Arc;

use clap::Parser;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use tc_cli::cli::{Cli, Command, ConfigCommand};
use tc_cli::terminal::TerminalNotifier;
use tc_client::{AppState, DeleteOutcome};
use tc_domain::config::LoggingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Version) => {
            println!("tripchat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = tc_cli::cli::load_config()?;
            let valid = tc_cli::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = tc_cli::cli::load_config()?;
            tc_cli::cli::config::show(&config)
        }
        command => {
            let (config, _) = tc_cli::cli::load_config()?;
            init_cli_tracing(&config.logging);
            let app = AppState::connect(config, Arc::new(TerminalNotifier))?;
            app.auth.restore();
            run(app, command).await
        }
    }
}

/// Commands that need the client stack.
async fn run(app: AppState, command: Option<Command>) -> anyhow::Result<()> {
    match command {
        None => {
            let route = app.resume_route();
            tc_cli::cli::chat::chat(app, &route).await
        }
        Some(Command::Chat { session }) => {
            let route = session.unwrap_or_else(|| app.resume_route());
            tc_cli::cli::chat::chat(app, &route).await
        }
        Some(Command::Login) => {
            let mut rl = DefaultEditor::new()?;
            tc_cli::cli::account::login(&app, &mut rl).await
        }
        Some(Command::Register) => {
            let mut rl = DefaultEditor::new()?;
            tc_cli::cli::account::register(&app, &mut rl).await
        }
        Some(Command::Logout) => {
            tc_cli::cli::account::logout(&app);
            Ok(())
        }
        Some(Command::Whoami) => {
            tc_cli::cli::account::whoami(&app);
            Ok(())
        }
        Some(Command::History) => tc_cli::cli::chats::history(&app).await,
        Some(Command::Delete { id, yes }) => {
            let mut rl = DefaultEditor::new()?;
            match tc_cli::cli::chats::delete(&app, &mut rl, &id, yes).await? {
                DeleteOutcome::Failed { message, .. } => anyhow::bail!("delete failed: {message}"),
                DeleteOutcome::NotSignedIn => anyhow::bail!("not signed in"),
                _ => Ok(()),
            }
        }
        Some(Command::Transcribe { file }) => {
            let text = tc_cli::cli::voice::transcribe(&app, &file).await?;
            println!("{text}");
            Ok(())
        }
        Some(Command::Version) | Some(Command::Config(_)) => Ok(()),
    }
}

/// Log to stderr so stdout stays clean for replies. `RUST_LOG` wins over
/// the configured filter.
fn init_cli_tracing(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cfg.json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

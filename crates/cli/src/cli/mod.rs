pub mod account;
pub mod chat;
pub mod chats;
pub mod config;
pub mod voice;

use clap::{Parser, Subcommand};

/// TripChat: a travel-planning assistant in your terminal.
#[derive(Debug, Parser)]
#[command(name = "tripchat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive chat (default when no subcommand is given).
    Chat {
        /// Chat id to open, or "new" for a fresh chat. Defaults to the
        /// last chat opened on this machine.
        #[arg(long)]
        session: Option<String>,
    },
    /// Sign in with email and password.
    Login,
    /// Create an account and sign in.
    Register,
    /// Forget the stored credentials.
    Logout,
    /// Show the current identity.
    Whoami,
    /// List your chats.
    History,
    /// Permanently delete a chat.
    Delete {
        /// Chat id to delete.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Transcribe an audio recording and print the text.
    Transcribe {
        /// Path to a webm/wav/mp3/ogg/m4a file.
        file: std::path::PathBuf,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `TC_CONFIG` (or
/// `tripchat.toml` by default). A missing file means all defaults.
/// Returns the parsed [`Config`] and the path that was used.
///
/// [`Config`]: tc_domain::config::Config
pub fn load_config() -> anyhow::Result<(tc_domain::config::Config, String)> {
    let config_path = std::env::var("TC_CONFIG").unwrap_or_else(|_| "tripchat.toml".into());
    let config = read_config(std::path::Path::new(&config_path))?;
    Ok((config, config_path))
}

fn read_config(path: &std::path::Path) -> anyhow::Result<tc_domain::config::Config> {
    if !path.exists() {
        return Ok(tc_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}

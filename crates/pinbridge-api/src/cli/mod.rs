//! CLI command definitions for the `pinbridge` binary.

pub mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Link Telegram chats to durable user records.
#[derive(Parser)]
#[command(name = "pinbridge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed logging (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the TOML configuration file.
    #[arg(
        long,
        global = true,
        env = "PINBRIDGE_CONFIG",
        default_value = "pinbridge.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API, the Telegram poller and the event consumer.
    Serve {
        /// Override `[server] bind_addr`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Apply database migrations and exit.
    Migrate,

    /// Show a registered user.
    Show {
        /// User id (UUID).
        user_id: String,
    },
}

/// Log filter for the given `-v` count, or `None` to keep the configured level.
pub fn verbosity_filter(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info,pinbridge_api=debug,pinbridge_core=debug,pinbridge_infra=debug"),
        _ => Some("trace"),
    }
}

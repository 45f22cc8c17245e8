//! CLI command definitions for the `missive` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod message;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Store, browse and search chat messages grouped by session.
#[derive(Parser)]
#[command(name = "missive", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config.toml (defaults to <data_dir>/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Export tracing spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API and WebSocket server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Store a new message.
    Send {
        /// Session the message belongs to.
        #[arg(long)]
        session: String,

        /// Sender role: user or system.
        #[arg(long, default_value = "user")]
        sender: String,

        /// Message text.
        #[arg(long)]
        content: String,

        /// Explicit message id (generated when omitted).
        #[arg(long)]
        id: Option<String>,

        /// ISO-8601 timestamp (now when omitted).
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Show a single message.
    Show {
        /// Message id to display.
        message_id: String,
    },

    /// List a session's messages, oldest first.
    #[command(alias = "ls")]
    List {
        /// Session to list.
        session_id: String,

        #[arg(long, default_value_t = 10)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,

        /// Only messages from this sender.
        #[arg(long)]
        sender: Option<String>,
    },

    /// Message counts for a session.
    Stats {
        session_id: String,
    },

    /// Search message content across all sessions.
    Search {
        /// Case-insensitive substring (at least 3 characters).
        query: String,

        #[arg(long, default_value_t = 10)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// List sessions, most recently active first.
    Sessions {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },

    /// Delete a message.
    #[command(alias = "rm")]
    Delete {
        message_id: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_send_with_globals() {
        let cli = Cli::try_parse_from([
            "missive", "--json", "-vv", "send", "--session", "s1", "--content", "hi",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Send { session, sender, content, id, .. } => {
                assert_eq!(session, "s1");
                assert_eq!(sender, "user");
                assert_eq!(content, "hi");
                assert!(id.is_none());
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn list_alias_and_defaults() {
        let cli = Cli::try_parse_from(["missive", "ls", "s1"]).unwrap();
        match cli.command {
            Commands::List { session_id, limit, offset, sender } => {
                assert_eq!(session_id, "s1");
                assert_eq!(limit, 10);
                assert_eq!(offset, 0);
                assert!(sender.is_none());
            }
            _ => panic!("expected list"),
        }
    }
}

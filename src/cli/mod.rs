//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Emoji Porter - Copy custom emojis from one Misskey instance to another.
#[derive(Parser, Debug)]
#[command(name = "emoji-porter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what this tool does and what the destination token needs.
    Notice,

    /// Fetch and list the emoji catalog of a source instance.
    Fetch {
        /// Source instance (https:// is assumed when no scheme is given).
        #[arg(short, long)]
        source: Option<String>,

        /// Only list emojis whose name, category or alias contains this text.
        #[arg(long)]
        search: Option<String>,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Import emojis from the source instance into the destination instance.
    Import {
        /// Source instance (https:// is assumed when no scheme is given).
        #[arg(short, long)]
        source: Option<String>,

        /// Destination instance, used as typed (include the scheme).
        #[arg(short, long)]
        destination: Option<String>,

        /// Admin API token for the destination (falls back to the stored token).
        #[arg(short, long)]
        token: Option<String>,

        /// Emoji names to import, in import order.
        #[arg(short, long = "name", conflicts_with = "all", required_unless_present = "all")]
        names: Vec<String>,

        /// Import every emoji matching --search (or the whole catalog).
        #[arg(long)]
        all: bool,

        /// Restrict --all to emojis matching this text.
        #[arg(long, requires = "all")]
        search: Option<String>,

        /// Import only the first selected emoji.
        #[arg(long)]
        first_only: bool,

        /// Number of request log lines to show afterwards (0 hides the log).
        #[arg(long, default_value = "10")]
        log_lines: usize,
    },

    /// Manage stored per-domain API tokens.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store tokens for a domain, replacing any previous pair.
    Set {
        /// Domain the tokens belong to (as passed to --destination).
        domain: String,

        /// Token with admin emoji permission.
        #[arg(long)]
        emoji_token: String,

        /// Token with drive permission.
        #[arg(long, default_value = "")]
        drive_token: String,
    },

    /// Show the stored tokens for a domain (masked).
    Get {
        domain: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default config file if none exists.
    Init,

    /// Print the effective configuration.
    Show,

    /// Save default source/destination domains.
    Set {
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        destination: Option<String>,
    },
}

/// Parse an output format argument.
pub fn parse_format(format: &str) -> Result<OutputFormat, String> {
    format.parse()
}

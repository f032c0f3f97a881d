use clap::{Parser, Subcommand};

use crate::config::Settings;

/// Classify news articles and log each interaction.
#[derive(Debug, Parser)]
#[command(name = "newsdesk", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify one article and record it.
    Classify {
        /// Name recorded with the interaction.
        #[arg(long, env = "NEWSDESK_USER")]
        name: String,
        /// Article text; read from stdin when omitted.
        text: Option<String>,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Classify articles from stdin, one per line, as one user.
    Session {
        #[arg(long, env = "NEWSDESK_USER")]
        name: String,
    },
    /// Download the model and tokenizer if they are not cached, then exit.
    Fetch,
    /// Create the interaction table if it does not exist.
    InitDb,
    /// Show the most recent interactions.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// One JSON object per line.
        #[arg(long)]
        json: bool,
    },
}

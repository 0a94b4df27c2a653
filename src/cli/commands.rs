use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedbot")]
#[command(about = "Watches feeds and delivers each new item once to a Telegram chat")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot: poll feeds on an interval and answer chat commands
    Run {
        /// Log notifications instead of sending them (no Telegram credentials needed)
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a single poll cycle and exit
    Poll {
        /// Log notifications instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Start watching a feed
    Add {
        /// Unique name for the source
        name: String,
        /// Feed URL (RSS, Atom or JSON Feed)
        url: String,
    },

    /// Stop watching a feed
    Remove {
        /// Name of the source to remove
        name: String,
    },

    /// List watched feeds
    List,
}

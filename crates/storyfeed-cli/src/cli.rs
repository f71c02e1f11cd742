//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::comments::CommentsArgs;
use crate::commands::config::ConfigCommand;
use crate::commands::stream::StreamArgs;

/// Follow the story analysis stream from the terminal.
#[derive(Parser, Debug)]
#[command(name = "storyfeed")]
#[command(author, version = env!("STORYFEED_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Story source: an http(s):// backend or a file:// capture directory.
    /// Overrides STORYFEED_SOURCE and the config file.
    #[arg(long, global = true)]
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream analysed stories
    Stream(StreamArgs),

    /// Fetch further comments for a story
    Comments(CommentsArgs),

    /// Show or change the stored configuration
    Config(ConfigCommand),
}

//! storyfeed - CLI for following the story analysis stream.
//!
//! A thin wrapper over the storyfeed engine: streams pages of analysed
//! stories from a backend or a directory of recorded captures.

mod cli;
mod commands;
mod output;
mod settings;
mod source;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{comments, config, stream};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let source = cli.source.as_deref();
    match cli.command {
        Commands::Stream(args) => stream::run(args, source).await,
        Commands::Comments(args) => comments::run(args, source).await,
        Commands::Config(cmd) => config::handle(cmd),
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays clean for story output.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

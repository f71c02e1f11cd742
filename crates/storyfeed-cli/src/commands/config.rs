//! Config subcommand implementations.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use storyfeed_core::BaseUrl;

use crate::output;
use crate::settings::{DEFAULT_SOURCE, storage};

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Display the stored configuration
    Show(ShowArgs),

    /// Change stored settings
    Set(SetArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Default story source (http(s):// or file://)
    #[arg(long = "default-source")]
    pub default_source: Option<String>,

    /// Stories per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// First reconnect delay in milliseconds
    #[arg(long)]
    pub backoff_base_ms: Option<u64>,

    /// Reconnect attempts before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

pub fn handle(cmd: ConfigCommand) -> Result<()> {
    match cmd.command {
        ConfigSubcommand::Show(args) => show(args),
        ConfigSubcommand::Set(args) => set(args),
    }
}

fn show(args: ShowArgs) -> Result<()> {
    let settings = storage::load().context("Failed to load config")?;

    if args.json {
        return output::json_pretty(&settings);
    }

    let source = settings
        .source
        .as_ref()
        .map(BaseUrl::to_string)
        .unwrap_or_else(|| format!("{DEFAULT_SOURCE} (default)"));

    output::field("Path", &storage::config_path()?.display().to_string());
    output::field("Source", &source);
    output::field("Page size", &settings.feed.page_size.to_string());
    output::field("Backoff base (ms)", &settings.feed.backoff_base_ms.to_string());
    output::field("Max attempts", &settings.feed.max_attempts.to_string());

    Ok(())
}

fn set(args: SetArgs) -> Result<()> {
    let mut settings = storage::load().context("Failed to load config")?;

    if let Some(source) = &args.default_source {
        settings.source = Some(BaseUrl::new(source).context("Invalid source URL")?);
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            bail!("Page size must be at least 1");
        }
        settings.feed.page_size = page_size;
    }
    if let Some(base) = args.backoff_base_ms {
        settings.feed.backoff_base_ms = base;
    }
    if let Some(max) = args.max_attempts {
        settings.feed.max_attempts = max;
    }

    let path = storage::save(&settings).context("Failed to save config")?;
    output::success(&format!("Saved {}", path.display()));

    Ok(())
}

//! Comments command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use storyfeed_core::{StoryId, StorySource};

use crate::output;
use crate::settings::storage;
use crate::source::CliSource;

#[derive(Args, Debug)]
pub struct CommentsArgs {
    /// Story id
    #[arg(long)]
    pub id: String,

    /// Number of comments to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Output the page as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CommentsArgs, source_flag: Option<&str>) -> Result<()> {
    let settings = storage::load().context("Failed to load config")?;
    let url = settings.resolve_source(source_flag)?;
    let source = CliSource::open_url(&url)?;
    let id = StoryId::new(&args.id).context("Invalid story id")?;

    let page = source
        .fetch_comments(&id, args.offset)
        .await
        .with_context(|| format!("Failed to load comments for story {id}"))?;

    if args.json {
        return output::json(&page);
    }

    if page.comments.is_empty() {
        eprintln!("{}", "No comments found.".dimmed());
        return Ok(());
    }

    for comment in &page.comments {
        output::comment(comment);
    }

    if page.has_more {
        let next = args.offset as usize + page.comments.len();
        eprintln!();
        eprintln!("{}: {}", "Next offset".dimmed(), next);
    }

    Ok(())
}

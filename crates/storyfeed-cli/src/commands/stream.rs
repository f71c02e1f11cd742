//! Stream command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use futures_util::StreamExt;

use storyfeed_core::{Story, StoryId};
use storyfeed_engine::{Feed, Snapshot, Subscription};

use crate::output;
use crate::settings::storage;
use crate::source::CliSource;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Offset of the first page
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Stories per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Number of pages to load while the server has more
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Output stories as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Tracks what has been printed, so each snapshot only prints changes.
#[derive(Default)]
struct Printer {
    seen: HashMap<StoryId, Story>,
    json: bool,
}

impl Printer {
    fn print_changes(&mut self, snapshot: &Snapshot) -> Result<()> {
        for entry in snapshot.stories() {
            let previous = self.seen.get(entry.id());
            if previous == Some(&entry.story) {
                continue;
            }

            let is_new = previous.is_none();
            if self.json {
                output::json(entry)?;
            } else {
                output::story(entry, is_new);
            }
            self.seen.insert(entry.id().clone(), entry.story.clone());
        }
        Ok(())
    }
}

/// How a page ended.
enum PageEnd {
    Finished,
    Interrupted,
}

pub async fn run(args: StreamArgs, source_flag: Option<&str>) -> Result<()> {
    let settings = storage::load().context("Failed to load config")?;
    let url = settings.resolve_source(source_flag)?;
    let source = CliSource::open_url(&url)?;
    let limit = args.limit.unwrap_or(settings.feed.page_size);

    eprintln!("{} {}", "Streaming from".dimmed(), url);
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());
    eprintln!();

    let feed = Feed::new(source, settings.feed);
    let mut printer = Printer {
        json: args.json,
        ..Default::default()
    };

    for page in 0..args.pages.max(1) {
        let sub = if page == 0 {
            feed.start(args.offset, limit)
        } else {
            feed.load_more()
        };

        match follow(sub, &mut printer).await? {
            PageEnd::Finished => {}
            PageEnd::Interrupted => {
                eprintln!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
        }

        if !feed.current().has_more() {
            break;
        }
    }

    let current = feed.current();
    eprintln!();
    eprintln!(
        "{} {} stories{}",
        "Done:".dimmed(),
        current.len(),
        if current.has_more() {
            ", more available"
        } else {
            ""
        }
    );

    Ok(())
}

/// Print a subscription until it ends, or until Ctrl+C cancels it.
async fn follow(mut sub: Subscription, printer: &mut Printer) -> Result<PageEnd> {
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            item = sub.next() => match item {
                Some(Ok(snapshot)) => printer.print_changes(&snapshot)?,
                Some(Err(e)) => return Err(e).context("Stream failed"),
                None => return Ok(PageEnd::Finished),
            },
            _ = &mut interrupt => break,
        }
    }

    sub.cancel();
    Ok(PageEnd::Interrupted)
}

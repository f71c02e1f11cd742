//! Story source wrapper for CLI use.

use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

use storyfeed_core::traits::{PageRequest, StorySource};
use storyfeed_core::{BaseUrl, CommentPage, StoryId, StreamEvent};
use storyfeed_file::FileSource;
use storyfeed_http::{HttpOptions, HttpSource};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub type BoxedEvents = Pin<Box<dyn Stream<Item = storyfeed_core::Result<StreamEvent>> + Send>>;

/// Either backend, chosen by the source URL's scheme.
#[derive(Debug)]
pub enum CliSource {
    File(FileSource),
    Http(HttpSource),
}

impl CliSource {
    pub fn open_url(url: &BaseUrl) -> Result<Self> {
        if url.is_local() {
            let source = FileSource::from_url(url).context("Failed to open capture directory")?;
            Ok(CliSource::File(source))
        } else {
            let source = HttpSource::new(url.clone(), HttpOptions::with_timeout(CONNECT_TIMEOUT))
                .context("Failed to create HTTP client")?;
            Ok(CliSource::Http(source))
        }
    }
}

#[async_trait]
impl StorySource for CliSource {
    type Stream = BoxedEvents;

    async fn open(&self, page: PageRequest) -> storyfeed_core::Result<Self::Stream> {
        match self {
            CliSource::File(source) => Ok(source.open(page).await?.boxed()),
            CliSource::Http(source) => Ok(source.open(page).await?.boxed()),
        }
    }

    async fn fetch_comments(
        &self,
        id: &StoryId,
        offset: u32,
    ) -> storyfeed_core::Result<CommentPage> {
        match self {
            CliSource::File(source) => source.fetch_comments(id, offset).await,
            CliSource::Http(source) => source.fetch_comments(id, offset).await,
        }
    }
}

//! File-backed story source.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use storyfeed_core::error::InvalidInputError;
use storyfeed_core::traits::{PageRequest, StorySource};
use storyfeed_core::{BaseUrl, CommentPage, Error, Result, StoryId};

use crate::store::CaptureStore;
use crate::stream::FileEventStream;

/// A story source replaying recorded captures from a directory.
///
/// The page limit is ignored: each capture already holds exactly what the
/// server sent for its offset.
#[derive(Debug, Clone)]
pub struct FileSource {
    store: CaptureStore,
    pacing: Option<Duration>,
}

impl FileSource {
    /// Create a source reading captures from `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            store: CaptureStore::new(root),
            pacing: None,
        }
    }

    /// Create a source for a `file://` base URL.
    pub fn from_url(url: &BaseUrl) -> Result<Self> {
        let path = url.to_file_path().ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::BaseUrl {
                value: url.to_string(),
                reason: "not a file:// URL".to_string(),
            })
        })?;
        Ok(Self::new(path))
    }

    /// Wait `delay` before each replayed event.
    pub fn with_pacing(mut self, delay: Duration) -> Self {
        self.pacing = Some(delay);
        self
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }
}

#[async_trait]
impl StorySource for FileSource {
    type Stream = FileEventStream;

    async fn open(&self, page: PageRequest) -> Result<Self::Stream> {
        let file = self.store.open_stream(page.offset).await?;
        info!(offset = page.offset, root = %self.store.root().display(), "Replaying capture");
        Ok(FileEventStream::from_file(file, self.pacing))
    }

    async fn fetch_comments(&self, id: &StoryId, offset: u32) -> Result<CommentPage> {
        let page = self.store.comments(id, offset).await?;
        debug!(%id, offset, count = page.comments.len(), "Read captured comments");
        Ok(page)
    }
}

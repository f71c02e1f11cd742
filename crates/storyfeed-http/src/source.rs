//! Network-backed story source.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use storyfeed_core::traits::{PageRequest, StorySource};
use storyfeed_core::{BaseUrl, CommentPage, Result, StoryId};

use crate::client::{ANALYZE, AnalyzeQuery, COMMENTS, CommentsQuery, HttpClient, HttpOptions};
use crate::stream::HttpEventStream;

/// A story source talking to the analysis backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: HttpClient,
    options: HttpOptions,
}

impl HttpSource {
    /// Create a source for the backend at `base`.
    pub fn new(base: BaseUrl, options: HttpOptions) -> Result<Self> {
        let client = HttpClient::new(base, &options)?;
        Ok(Self { client, options })
    }

    /// Returns the backend base URL.
    pub fn url(&self) -> &BaseUrl {
        self.client.base()
    }

    pub fn options(&self) -> &HttpOptions {
        &self.options
    }
}

#[async_trait]
impl StorySource for HttpSource {
    type Stream = HttpEventStream;

    #[instrument(skip(self), fields(base = %self.url()))]
    async fn open(&self, page: PageRequest) -> Result<Self::Stream> {
        let query = AnalyzeQuery {
            offset: page.offset,
            limit: page.limit,
        };
        let response = self.client.open_stream(ANALYZE, &query).await?;
        info!(offset = page.offset, limit = page.limit, "Event stream open");
        Ok(HttpEventStream::from_response(response, self.options.timeout))
    }

    #[instrument(skip(self), fields(base = %self.url()))]
    async fn fetch_comments(&self, id: &StoryId, offset: u32) -> Result<CommentPage> {
        let query = CommentsQuery {
            id: id.as_str(),
            offset,
        };
        let page: CommentPage = self.client.get_json(COMMENTS, &query).await?;
        debug!(count = page.comments.len(), has_more = page.has_more, "Fetched comments");
        Ok(page)
    }
}

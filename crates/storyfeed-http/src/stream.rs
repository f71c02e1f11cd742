//! Server-sent event stream over an HTTP response body.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tracing::{debug, trace, warn};

use storyfeed_core::sse::SseDecoder;
use storyfeed_core::{Result, StreamEvent};

use crate::client::transport_error;

/// Event stream for one open `/analyze` connection.
///
/// Yields events in arrival order. A body read error is yielded once and
/// ends the stream; a clean end of body simply ends it.
pub struct HttpEventStream {
    inner: Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>,
}

impl HttpEventStream {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    pub(crate) fn from_response(response: reqwest::Response, timeout: Option<Duration>) -> Self {
        let stream = async_stream::stream! {
            let mut body = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        trace!(len = bytes.len(), "Received chunk");
                        for frame in decoder.feed(&bytes) {
                            yield Ok(StreamEvent::from(frame));
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Event stream read failed");
                        yield Err(transport_error(e, timeout));
                        return;
                    }
                }
            }

            if let Some(frame) = decoder.finish() {
                yield Ok(StreamEvent::from(frame));
            }
            debug!("Event stream ended");
        };

        Self::new(stream)
    }
}

impl Stream for HttpEventStream {
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for HttpEventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEventStream").finish_non_exhaustive()
    }
}

//! Event stream replayed from a capture file.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace, warn};

use storyfeed_core::sse::SseDecoder;
use storyfeed_core::{Result, StreamEvent};

use crate::store::map_io;

const READ_CHUNK: usize = 8 * 1024;

/// Event stream for one replayed capture.
pub struct FileEventStream {
    inner: Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>,
}

impl FileEventStream {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Replay `file`, sleeping `pacing` before each event when set.
    pub(crate) fn from_file(mut file: tokio::fs::File, pacing: Option<Duration>) -> Self {
        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            let mut buf = vec![0u8; READ_CHUNK];

            loop {
                let n = match file.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        warn!(error = %e, "Capture read failed");
                        yield Err(map_io(e));
                        return;
                    }
                };
                trace!(len = n, "Read chunk");

                for frame in decoder.feed(&buf[..n]) {
                    if let Some(delay) = pacing {
                        tokio::time::sleep(delay).await;
                    }
                    yield Ok(StreamEvent::from(frame));
                }
            }

            if let Some(frame) = decoder.finish() {
                yield Ok(StreamEvent::from(frame));
            }
            debug!("Capture replay finished");
        };

        Self::new(stream)
    }
}

impl Stream for FileEventStream {
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for FileEventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEventStream").finish_non_exhaustive()
    }
}

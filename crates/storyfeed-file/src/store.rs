//! Layout of a capture directory.
//!
//! ```text
//! <root>/
//!   analyze-0.sse        raw event stream for offset 0
//!   analyze-10.sse       ... offset 10
//!   comments-4242.json   comment list (or page) for story 4242
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use storyfeed_core::error::{ProtocolError, TransportError};
use storyfeed_core::{Comment, CommentPage, Error, Result, StoryId};

/// Comments returned per one-shot fetch.
pub const COMMENTS_PAGE_SIZE: usize = 10;

pub(crate) fn map_io(err: std::io::Error) -> Error {
    Error::Transport(TransportError::Http {
        message: format!("IO error: {}", err),
    })
}

/// Read-only view of a directory of recorded captures.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    root: PathBuf,
}

impl CaptureStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the recorded stream for a page offset.
    pub fn stream_path(&self, offset: u32) -> PathBuf {
        self.root.join(format!("analyze-{offset}.sse"))
    }

    /// Path of the recorded comments for a story.
    pub fn comments_path(&self, id: &StoryId) -> PathBuf {
        self.root
            .join(format!("comments-{}.json", file_safe(id.as_str())))
    }

    /// Open the recorded stream for `offset`.
    ///
    /// A missing capture is reported the way an unreachable server would be.
    #[instrument(skip(self))]
    pub(crate) async fn open_stream(&self, offset: u32) -> Result<tokio::fs::File> {
        let path = self.stream_path(offset);
        debug!(path = %path.display(), "Opening capture");

        tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::Transport(TransportError::Connection {
                message: format!("no capture for offset {offset} at {}", path.display()),
            }),
            _ => map_io(e),
        })
    }

    /// Read the page of comments starting at `offset`.
    #[instrument(skip(self))]
    pub(crate) async fn comments(&self, id: &StoryId, offset: u32) -> Result<CommentPage> {
        let path = self.comments_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::Protocol(ProtocolError::new(
                    404,
                    Some(format!("no comments captured for story {id}")),
                )));
            }
            Err(e) => return Err(map_io(e)),
        };

        let all: CommentPage = serde_json::from_slice(&bytes).map_err(|e| {
            Error::Protocol(ProtocolError::new(
                500,
                Some(format!("invalid comment capture {}: {e}", path.display())),
            ))
        })?;

        Ok(slice_page(all.comments, offset as usize))
    }
}

fn slice_page(comments: Vec<Comment>, offset: usize) -> CommentPage {
    let end = offset.saturating_add(COMMENTS_PAGE_SIZE);
    let has_more = comments.len() > end;
    let comments = comments
        .into_iter()
        .skip(offset)
        .take(COMMENTS_PAGE_SIZE)
        .collect();
    CommentPage { comments, has_more }
}

/// Convert a story id into a filesystem-safe name segment.
fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments(n: usize) -> Vec<Comment> {
        (0..n)
            .map(|i| Comment::new(format!("user{i}"), format!("comment {i}")))
            .collect()
    }

    #[test]
    fn paths_follow_layout() {
        let store = CaptureStore::new("/captures");
        assert_eq!(store.stream_path(20), Path::new("/captures/analyze-20.sse"));
        assert_eq!(
            store.comments_path(&StoryId::new("4242").unwrap()),
            Path::new("/captures/comments-4242.json")
        );
    }

    #[test]
    fn ids_are_made_file_safe() {
        assert_eq!(file_safe("a/b:c"), "a_b_c");
        assert_eq!(file_safe("abc-1_2"), "abc-1_2");
    }

    #[test]
    fn slices_pages_of_ten() {
        let first = slice_page(comments(25), 0);
        assert_eq!(first.comments.len(), 10);
        assert!(first.has_more);

        let last = slice_page(comments(25), 20);
        assert_eq!(last.comments.len(), 5);
        assert_eq!(last.comments[0].author, "user20");
        assert!(!last.has_more);

        let exact = slice_page(comments(20), 10);
        assert_eq!(exact.comments.len(), 10);
        assert!(!exact.has_more);

        assert!(slice_page(comments(3), 10).comments.is_empty());
    }
}

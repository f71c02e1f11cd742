//! storyfeed-file - Filesystem-backed story source.
//!
//! Replays recorded `/analyze` streams and comment captures from a local
//! directory, for offline use and deterministic tests.

mod source;
mod store;
mod stream;

pub use source::FileSource;
pub use store::{COMMENTS_PAGE_SIZE, CaptureStore};
pub use stream::FileEventStream;

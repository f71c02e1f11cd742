//! storyfeed-http - HTTP/SSE-backed story source.

mod client;
mod source;
mod stream;

pub use client::HttpOptions;
pub use source::HttpSource;
pub use stream::HttpEventStream;

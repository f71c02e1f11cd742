//! storyfeed-engine - Streaming ingestion and reconciliation engine.
//!
//! A [`Feed`] owns the story collection for one listing. Each call to
//! [`Feed::start`] runs a [`Session`] state machine on its own task, feeding
//! it one transport event at a time, and hands the caller a [`Subscription`]
//! of immutable [`Snapshot`]s.
//!
//! # Example
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use storyfeed_core::Result;
//! use storyfeed_engine::{Feed, FeedConfig};
//! # use storyfeed_core::StorySource;
//!
//! # async fn example<S: StorySource>(source: S) -> Result<()> {
//! let feed = Feed::new(source, FeedConfig::default());
//! let mut sub = feed.start(0, 10);
//! while let Some(snapshot) = sub.next().await {
//!     let snapshot = snapshot?;
//!     println!("{} stories", snapshot.len());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod driver;
mod feed;
mod publisher;
pub mod session;
mod shared;
mod snapshot;
mod subscription;
mod transport;

pub use config::FeedConfig;
pub use feed::{CommentsUpdate, Feed};
pub use publisher::Publisher;
pub use session::{Action, Input, Session, SessionState};
pub use snapshot::Snapshot;
pub use subscription::Subscription;

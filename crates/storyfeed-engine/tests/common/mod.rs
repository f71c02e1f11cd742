//! Scripted in-memory story source for engine tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, stream};

use storyfeed_core::error::TransportError;
use storyfeed_core::{CommentPage, Error, PageRequest, Result, StoryId, StorySource, StreamEvent};
use storyfeed_engine::{Snapshot, Subscription};

type Events = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// A scripted connection. Counts itself as open until dropped.
pub struct ScriptedStream {
    events: Events,
    open: Arc<AtomicUsize>,
}

impl ScriptedStream {
    fn new(events: Events, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { events, open }
    }
}

impl Stream for ScriptedStream {
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One item a scripted connection produces.
pub enum Step {
    Event(StreamEvent),
    Fail(TransportError),
    /// Stop producing without ending the stream.
    Hang,
}

/// What the source does for one `open` call.
pub enum Connection {
    Refuse(Error),
    Stream(Vec<Step>),
}

#[derive(Default)]
pub struct ScriptedSource {
    connections: Mutex<VecDeque<Connection>>,
    opened: Mutex<Vec<PageRequest>>,
    comments: Mutex<HashMap<(String, u32), Result<CommentPage>>>,
    open: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            connections: Mutex::new(connections.into()),
            ..Default::default()
        }
    }

    pub fn push(&self, connection: Connection) {
        self.connections.lock().unwrap().push_back(connection);
    }

    pub fn with_comments(self, id: &str, offset: u32, page: Result<CommentPage>) -> Self {
        self.comments
            .lock()
            .unwrap()
            .insert((id.to_string(), offset), page);
        self
    }

    /// Connections handed out and not yet dropped.
    pub fn open_transports(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Every page `open` was called with, in order.
    pub fn opened(&self) -> Vec<PageRequest> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorySource for ScriptedSource {
    type Stream = ScriptedStream;

    async fn open(&self, page: PageRequest) -> Result<Self::Stream> {
        self.opened.lock().unwrap().push(page);
        let next = self.connections.lock().unwrap().pop_front();

        let steps = match next {
            Some(Connection::Stream(steps)) => steps,
            Some(Connection::Refuse(err)) => return Err(err),
            None => {
                return Err(TransportError::Connection {
                    message: "no scripted connection left".to_string(),
                }
                .into());
            }
        };

        let hang = matches!(steps.last(), Some(Step::Hang));
        let items: Vec<Result<StreamEvent>> = steps
            .into_iter()
            .filter_map(|step| match step {
                Step::Event(event) => Some(Ok(event)),
                Step::Fail(err) => Some(Err(err.into())),
                Step::Hang => None,
            })
            .collect();

        let events = stream::iter(items);
        let events = if hang {
            events.chain(stream::pending()).boxed()
        } else {
            events.boxed()
        };
        Ok(ScriptedStream::new(events, self.open.clone()))
    }

    async fn fetch_comments(&self, id: &StoryId, offset: u32) -> Result<CommentPage> {
        self.comments
            .lock()
            .unwrap()
            .remove(&(id.to_string(), offset))
            .unwrap_or_else(|| Ok(CommentPage::default()))
    }
}

pub fn story_json(id: u32, title: &str) -> String {
    serde_json::json!({ "hn_id": id.to_string(), "title": title }).to_string()
}

pub fn message(id: u32) -> Step {
    Step::Event(StreamEvent::Message(story_json(id, &format!("story {id}"))))
}

pub fn message_json(value: serde_json::Value) -> Step {
    Step::Event(StreamEvent::Message(value.to_string()))
}

pub fn complete(has_more: bool) -> Step {
    Step::Event(StreamEvent::Complete(Some(
        serde_json::json!({ "has_more": has_more }).to_string(),
    )))
}

pub fn dropped() -> Step {
    Step::Fail(TransportError::Connection {
        message: "connection reset".to_string(),
    })
}

pub fn refused() -> Connection {
    Connection::Refuse(
        TransportError::Connection {
            message: "connection refused".to_string(),
        }
        .into(),
    )
}

/// Drain a subscription to its end.
pub async fn collect(mut sub: Subscription) -> Vec<Result<Snapshot>> {
    let mut items = Vec::new();
    while let Some(item) = sub.next().await {
        items.push(item);
    }
    items
}

/// Story ids of a snapshot, in display order.
pub fn ids(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .stories()
        .iter()
        .map(|entry| entry.id().to_string())
        .collect()
}

pub fn page(offset: u32, limit: u32) -> PageRequest {
    PageRequest::new(offset, limit)
}

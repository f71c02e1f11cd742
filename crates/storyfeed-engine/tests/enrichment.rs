//! Comment enrichment and overlay tests.

mod common;

use futures_util::StreamExt;
use serde_json::json;

use storyfeed_core::error::{InvalidInputError, ProtocolError};
use storyfeed_core::{Comment, CommentPage, Error, StoryId, Toggle};
use storyfeed_engine::{Feed, FeedConfig};

use common::{
    Connection, ScriptedSource, Step, collect, complete, dropped, message, message_json,
};

fn id(s: &str) -> StoryId {
    StoryId::new(s).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_comments_are_deduplicated() {
    let source = ScriptedSource::new(vec![Connection::Stream(vec![
        message_json(json!({
            "hn_id": "1",
            "title": "story",
            "top_comments": [{ "author": "alice", "text": "first", "depth": 0 }]
        })),
        complete(false),
    ])])
    .with_comments(
        "1",
        10,
        Ok(CommentPage {
            comments: vec![
                Comment::new("alice", "first"),
                Comment::new("bob", "second"),
                Comment::new("bob", "second"),
            ],
            has_more: true,
        }),
    );
    let feed = Feed::new(source, FeedConfig::default());
    collect(feed.start(0, 10)).await;

    let update = feed.load_more_comments(&id("1"), 10).await.unwrap();

    assert_eq!(update.appended, 1);
    assert!(update.has_more);
    let comments = update
        .snapshot
        .get(&id("1"))
        .unwrap()
        .story
        .top_comments
        .clone()
        .unwrap();
    let authors: Vec<_> = comments.iter().map(|c| c.author.as_str()).collect();
    assert_eq!(authors, vec!["alice", "bob"]);
    assert_eq!(feed.current().get(&id("1")).unwrap().story.top_comments.as_ref().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_comment_failure_leaves_session_running() {
    let source = ScriptedSource::new(vec![Connection::Stream(vec![message(1), Step::Hang])])
        .with_comments("1", 0, Err(ProtocolError::new(500, None).into()));
    let feed = Feed::new(source, FeedConfig::default());

    let mut sub = feed.start(0, 10);
    sub.next().await.unwrap().unwrap();

    let err = feed.load_more_comments(&id("1"), 0).await.unwrap_err();
    match err {
        Error::Enrichment { story_id, source } => {
            assert_eq!(story_id, id("1"));
            assert!(matches!(*source, Error::Protocol(ProtocolError { status: 500, .. })));
        }
        other => panic!("expected enrichment error, got {other:?}"),
    }

    assert!(feed.is_active());
    assert!(sub.is_attached());
    sub.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_comments_for_unknown_story_rejected() {
    let feed = Feed::new(ScriptedSource::default(), FeedConfig::default());

    let err = feed.load_more_comments(&id("404"), 0).await.unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::UnknownStory { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_overlay_survives_later_emissions() {
    let feed = Feed::new(
        ScriptedSource::new(vec![
            Connection::Stream(vec![message(1), complete(true)]),
            Connection::Stream(vec![
                message_json(json!({
                    "hn_id": "1",
                    "title": "story 1 (updated)",
                    "hook": "A short summary"
                })),
                complete(false),
            ]),
        ]),
        FeedConfig::default(),
    );
    collect(feed.start(0, 10)).await;

    let toggled = feed.toggle(&id("1"), Toggle::Expanded).unwrap();
    assert!(toggled.get(&id("1")).unwrap().overlay.expanded);
    feed.toggle(&id("1"), Toggle::Comments).unwrap();

    collect(feed.load_more()).await;

    let current = feed.current();
    let entry = current.get(&id("1")).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(entry.story.title, "story 1 (updated)");
    assert_eq!(entry.story.hook.as_deref(), Some("A short summary"));
    assert!(entry.overlay.expanded);
    assert!(entry.overlay.show_comments);
    assert!(!entry.overlay.show_article);
}

#[tokio::test(start_paused = true)]
async fn test_enrichment_is_never_cleared_by_partial_emission() {
    let feed = Feed::new(
        ScriptedSource::new(vec![Connection::Stream(vec![
            message_json(json!({ "hn_id": "1", "title": "t", "hook": "kept" })),
            message_json(json!({ "hn_id": "1", "title": "t", "points": 42 })),
            complete(false),
        ])]),
        FeedConfig::default(),
    );

    collect(feed.start(0, 10)).await;

    let current = feed.current();
    let entry = current.get(&id("1")).unwrap();
    assert_eq!(entry.story.points, 42);
    assert_eq!(entry.story.hook.as_deref(), Some("kept"));
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_update_keeps_fields_it_omits() {
    let full = json!({
        "hn_id": "1",
        "title": "orig",
        "author": "alice",
        "points": 42,
        "url": "https://news.ycombinator.com/item?id=1",
        "comments_count": 7,
        "time": 1_700_000_000
    });
    let feed = Feed::new(
        ScriptedSource::new(vec![
            Connection::Stream(vec![message_json(full.clone()), message(2), dropped()]),
            Connection::Stream(vec![
                message_json(json!({ "hn_id": "1", "title": "updated" })),
                complete(false),
            ]),
        ]),
        FeedConfig::default(),
    );

    let items = collect(feed.start(0, 10)).await;
    assert!(items.iter().all(|item| item.is_ok()));

    let current = feed.current();
    assert_eq!(current.len(), 2);
    assert!(!current.has_more());
    let story = &current.get(&id("1")).unwrap().story;
    assert_eq!(story.title, "updated");
    assert_eq!(story.author, "alice");
    assert_eq!(story.points, 42);
    assert_eq!(story.url, "https://news.ycombinator.com/item?id=1");
    assert_eq!(story.comments_count, 7);
    assert_eq!(story.time, 1_700_000_000);
}

#[tokio::test(start_paused = true)]
async fn test_blank_title_record_is_dropped() {
    let feed = Feed::new(
        ScriptedSource::new(vec![Connection::Stream(vec![
            message_json(json!({ "hn_id": "1", "title": "" })),
            message(2),
            complete(false),
        ])]),
        FeedConfig::default(),
    );

    let items = collect(feed.start(0, 10)).await;

    assert_eq!(items.len(), 2);
    assert!(feed.current().get(&id("1")).is_none());
    assert_eq!(feed.current().len(), 1);
}

#[test]
fn test_toggle_unknown_story_rejected() {
    let feed = Feed::new(ScriptedSource::default(), FeedConfig::default());

    let err = feed.toggle(&id("1"), Toggle::Article).unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::UnknownStory { .. })
    ));
}

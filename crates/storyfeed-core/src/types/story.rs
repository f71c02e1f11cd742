//! Story records and their comments.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use super::StoryId;

/// One story as held by the collection.
///
/// Base fields are always set, falling back to defaults when the first
/// emission lacked them. Enrichment fields may be absent at first and
/// filled in by later emissions of the same `hn_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoryPatch")]
pub struct Story {
    /// Stable external key.
    pub hn_id: StoryId,

    pub title: String,

    /// Discussion URL.
    pub url: String,

    /// Target article URL.
    pub article_url: String,

    /// Score.
    pub points: i64,

    pub author: String,

    pub comments_count: u64,

    /// Publish time, unix seconds.
    pub time: i64,

    /// Rendered article body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_article_html: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_metadata: Option<serde_json::Value>,

    /// Screenshot reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<String>,

    /// Why the screenshot could not be taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_error: Option<String>,

    /// AI-generated summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,

    /// Partial tree of top comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_comments: Option<Vec<Comment>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,

    /// Inline pagination flag, server-declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

/// One emission of a story, exactly as it arrived.
///
/// Only the key and a non-empty title are required. Every other field is
/// `Some` only when the payload carried it, so a merge can leave fields the
/// server did not resend untouched. JSON `null` counts as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoryPatch {
    #[serde(alias = "id")]
    pub hn_id: StoryId,
    #[serde(deserialize_with = "non_empty_title")]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub article_url: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub comments_count: Option<u64>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub full_article_html: Option<String>,
    #[serde(default)]
    pub article_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub screenshot_path: Option<String>,
    #[serde(default)]
    pub screenshot_error: Option<String>,
    #[serde(default)]
    pub hook: Option<String>,
    #[serde(default)]
    pub top_comments: Option<Vec<Comment>>,
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

fn non_empty_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let title = String::deserialize(deserializer)?;
    if title.trim().is_empty() {
        return Err(de::Error::custom("empty title"));
    }
    Ok(title)
}

impl From<StoryPatch> for Story {
    fn from(patch: StoryPatch) -> Self {
        Self {
            hn_id: patch.hn_id,
            title: patch.title,
            url: patch.url.unwrap_or_default(),
            article_url: patch.article_url.unwrap_or_default(),
            points: patch.points.unwrap_or_default(),
            author: patch.author.unwrap_or_else(default_author),
            comments_count: patch.comments_count.unwrap_or_default(),
            time: patch.time.unwrap_or_default(),
            full_article_html: patch.full_article_html,
            article_metadata: patch.article_metadata,
            screenshot_path: patch.screenshot_path,
            screenshot_error: patch.screenshot_error,
            hook: patch.hook,
            top_comments: patch.top_comments,
            analysis: patch.analysis,
            has_more: patch.has_more,
        }
    }
}

impl From<Story> for StoryPatch {
    fn from(story: Story) -> Self {
        Self {
            hn_id: story.hn_id,
            title: story.title,
            url: Some(story.url),
            article_url: Some(story.article_url),
            points: Some(story.points),
            author: Some(story.author),
            comments_count: Some(story.comments_count),
            time: Some(story.time),
            full_article_html: story.full_article_html,
            article_metadata: story.article_metadata,
            screenshot_path: story.screenshot_path,
            screenshot_error: story.screenshot_error,
            hook: story.hook,
            top_comments: story.top_comments,
            analysis: story.analysis,
            has_more: story.has_more,
        }
    }
}

fn default_author() -> String {
    "unknown".to_string()
}

impl Story {
    /// Create a story with only its base fields set.
    pub fn new(hn_id: StoryId, title: impl Into<String>) -> Self {
        Self {
            hn_id,
            title: title.into(),
            url: String::new(),
            article_url: String::new(),
            points: 0,
            author: default_author(),
            comments_count: 0,
            time: 0,
            full_article_html: None,
            article_metadata: None,
            screenshot_path: None,
            screenshot_error: None,
            hook: None,
            top_comments: None,
            analysis: None,
            has_more: None,
        }
    }
}

/// A comment on a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default = "default_commenter")]
    pub author: String,

    /// Comment body.
    #[serde(default)]
    pub text: String,

    /// Nesting level, 0 for top-level.
    #[serde(default)]
    pub depth: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Comment>>,
}

fn default_commenter() -> String {
    "anonymous".to_string()
}

impl Comment {
    /// Create a top-level comment.
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            depth: 0,
            id: None,
            time: None,
            children: None,
        }
    }

    /// The identity used to deduplicate comments.
    ///
    /// There is no guaranteed server-side comment id, so two comments with
    /// the same author and text are the same comment.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.author, &self.text)
    }
}

/// One page of comments returned by the one-shot comment fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub has_more: bool,
}

impl<'de> Deserialize<'de> for CommentPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Older backends answer with a bare list.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Page {
                comments: Vec<Comment>,
                #[serde(default)]
                has_more: bool,
            },
            List(Vec<Comment>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Page { comments, has_more } => CommentPage { comments, has_more },
            Raw::List(comments) => CommentPage {
                comments,
                has_more: false,
            },
        })
    }
}

/// Locally-owned presentation flags for one story.
///
/// Never supplied by the server and never overwritten by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub expanded: bool,
    pub show_article: bool,
    pub show_comments: bool,
}

/// Which overlay flag to flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Expanded,
    Article,
    Comments,
}

impl Overlay {
    /// Flip one flag.
    pub fn toggle(&mut self, which: Toggle) {
        let flag = match which {
            Toggle::Expanded => &mut self.expanded,
            Toggle::Article => &mut self.show_article,
            Toggle::Comments => &mut self.show_comments,
        };
        *flag = !*flag;
    }
}

/// A story as stored in the collection: server data plus local overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryEntry {
    #[serde(flatten)]
    pub story: Story,
    pub overlay: Overlay,
}

impl StoryEntry {
    /// Returns the story key.
    pub fn id(&self) -> &StoryId {
        &self.story.hn_id
    }
}

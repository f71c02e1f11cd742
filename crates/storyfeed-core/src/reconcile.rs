//! Record reconciliation.
//!
//! The server re-emits stories as it enriches them. [`merge`] folds each
//! emission into what is already known without touching the local
//! [`Overlay`], and [`Collection`] keeps entries unique by key in
//! first-seen order.

use std::collections::{HashMap, HashSet};

use crate::types::{Comment, Overlay, StoryEntry, StoryId, StoryPatch, Toggle};

/// Merge an incoming emission into an existing entry, if there is one.
///
/// Every field `incoming` carries overwrites the stored one; fields it
/// lacks keep their stored value. The overlay is never taken from the
/// server.
pub fn merge(existing: Option<&StoryEntry>, incoming: StoryPatch) -> StoryEntry {
    let Some(existing) = existing else {
        return StoryEntry {
            story: incoming.into(),
            overlay: Overlay::default(),
        };
    };

    let mut story = existing.story.clone();
    story.title = incoming.title;
    overwrite(&mut story.url, incoming.url);
    overwrite(&mut story.article_url, incoming.article_url);
    overwrite(&mut story.points, incoming.points);
    overwrite(&mut story.author, incoming.author);
    overwrite(&mut story.comments_count, incoming.comments_count);
    overwrite(&mut story.time, incoming.time);
    fill(&mut story.full_article_html, incoming.full_article_html);
    fill(&mut story.article_metadata, incoming.article_metadata);
    fill(&mut story.screenshot_path, incoming.screenshot_path);
    fill(&mut story.screenshot_error, incoming.screenshot_error);
    fill(&mut story.hook, incoming.hook);
    fill(&mut story.top_comments, incoming.top_comments);
    fill(&mut story.analysis, incoming.analysis);
    fill(&mut story.has_more, incoming.has_more);

    StoryEntry {
        story,
        overlay: existing.overlay,
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Append comments whose `(author, text)` pair is not already present.
///
/// Duplicates inside `incoming` itself are collapsed too. Returns how many
/// comments were appended.
pub fn append_comments(existing: &mut Vec<Comment>, incoming: Vec<Comment>) -> usize {
    let mut seen: HashSet<(String, String)> = existing.iter().map(owned_key).collect();

    let before = existing.len();
    for comment in incoming {
        if seen.insert(owned_key(&comment)) {
            existing.push(comment);
        }
    }
    existing.len() - before
}

fn owned_key(comment: &Comment) -> (String, String) {
    let (author, text) = comment.dedup_key();
    (author.to_string(), text.to_string())
}

/// Ordered, key-unique collection of stories.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    entries: Vec<StoryEntry>,
    index: HashMap<StoryId, usize>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &StoryId) -> Option<&StoryEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[StoryEntry] {
        &self.entries
    }

    /// Insert a new story or merge it into the entry with the same key.
    ///
    /// Returns true when the story was not known before.
    pub fn upsert(&mut self, story: impl Into<StoryPatch>) -> bool {
        let story = story.into();
        match self.index.get(&story.hn_id) {
            Some(&i) => {
                let merged = merge(Some(&self.entries[i]), story);
                self.entries[i] = merged;
                false
            }
            None => {
                let id = story.hn_id.clone();
                self.entries.push(merge(None, story));
                self.index.insert(id, self.entries.len() - 1);
                true
            }
        }
    }

    /// Dedup-append comments to a known story.
    ///
    /// Returns `None` when the story is unknown, otherwise the number of
    /// comments appended.
    pub fn append_comments(&mut self, id: &StoryId, comments: Vec<Comment>) -> Option<usize> {
        let &i = self.index.get(id)?;
        let existing = self.entries[i].story.top_comments.get_or_insert_with(Vec::new);
        Some(append_comments(existing, comments))
    }

    /// Flip an overlay flag on a known story.
    pub fn toggle(&mut self, id: &StoryId, which: Toggle) -> Option<Overlay> {
        let &i = self.index.get(id)?;
        let overlay = &mut self.entries[i].overlay;
        overlay.toggle(which);
        Some(*overlay)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

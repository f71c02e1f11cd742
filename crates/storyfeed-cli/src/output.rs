//! Output formatting helpers.

use anyhow::Result;
use chrono::DateTime;
use colored::Colorize;
use serde::Serialize;

use storyfeed_core::{Comment, StoryEntry};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one story, marked as new or updated.
pub fn story(entry: &StoryEntry, is_new: bool) {
    let story = &entry.story;
    let tag = if is_new { "NEW".green() } else { "UPD".yellow() };

    println!(
        "{} {} {} {}",
        tag,
        format!("[{}]", story.hn_id).dimmed(),
        story.title.bold(),
        format!("({} points by {})", story.points, story.author).dimmed()
    );

    let mut details = Vec::new();
    if let Some(when) = timestamp(story.time) {
        details.push(when);
    }
    details.push(format!("{} comments", story.comments_count));
    if !story.article_url.is_empty() {
        details.push(story.article_url.clone());
    }
    println!("    {}", details.join(" · ").dimmed());

    if let Some(hook) = &story.hook {
        println!("    {}", hook.cyan());
    }
    if let Some(err) = &story.screenshot_error {
        println!("    {} {}", "screenshot failed:".red(), err);
    }
}

/// Print one comment, indented by depth.
pub fn comment(comment: &Comment) {
    let indent = "  ".repeat(comment.depth as usize);
    println!("{}{}", indent, comment.author.blue());
    for line in comment.text.lines() {
        println!("{}  {}", indent, line);
    }
}

fn timestamp(secs: i64) -> Option<String> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0).map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}

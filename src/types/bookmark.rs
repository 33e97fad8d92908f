use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a saved bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub favicon: String,
    pub view_count: i64,
    pub last_visited: Option<DateTime<Utc>>,
    pub date_added: DateTime<Utc>,
    pub archived: bool,
    pub pinned: bool,
}

/// Fields accepted when creating a bookmark.
///
/// Only `url` is mandatory; a missing title or favicon is filled from the
/// page metadata before the record is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBookmark {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub favicon: Option<String>,
    pub archived: Option<bool>,
    pub pinned: Option<bool>,
}

/// A fully resolved bookmark ready to be inserted; the store assigns id and `dateAdded`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub favicon: String,
    pub archived: bool,
    pub pinned: bool,
}

/// Partial update applied by `PUT /bookmarks/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub favicon: Option<String>,
    pub archived: Option<bool>,
    pub pinned: Option<bool>,
}

impl BookmarkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.favicon.is_none()
            && self.archived.is_none()
            && self.pinned.is_none()
    }
}

/// Ordering applied to bookmark listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    RecentlyAdded,
    MostVisited,
    RecentlyVisited,
}

impl SortOrder {
    /// Maps the `sort` query value; anything unrecognised falls back to `RecentlyAdded`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("mostVisited") => SortOrder::MostVisited,
            Some("recentlyVisited") => SortOrder::RecentlyVisited,
            _ => SortOrder::RecentlyAdded,
        }
    }
}

/// Filters for bookmark listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkFilter {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Every listed tag must be present on the bookmark.
    pub tags: Vec<String>,
    pub archived: Option<bool>,
    pub sort: SortOrder,
}

impl BookmarkFilter {
    /// Splits a comma-joined `tags` query value, trimming entries and dropping empties.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

/// One row of the tag aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

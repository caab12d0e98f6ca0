//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::collections::BTreeMap;

/// Settings key gating paste-to-add.
pub const AUTO_DETECT_CLIPBOARD_LINKS: &str = "autoDetectClipboardLinks";

/// A saved link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Usage counter; never negative.
    #[serde(default)]
    pub clicks: i64,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl Bookmark {
    /// Create a fresh bookmark with zero clicks, stamped now.
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            favicon_url: None,
            tags: Vec::new(),
            clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the click counter.
    pub fn with_clicks(mut self, clicks: i64) -> Self {
        self.clicks = clicks.max(0);
        self
    }
}

/// Bookmark row joined with its flattened tag list.
///
/// Column names follow the on-disk schema, which stays compatible with
/// database files exported by earlier releases.
#[derive(Debug, Clone, FromRow)]
pub struct BookmarkRow {
    pub id: String,
    pub title: String,
    pub url: String,
    #[sqlx(rename = "faviconUrl")]
    pub favicon_url: Option<String>,
    pub clicks: Option<i64>,
    #[sqlx(rename = "createdAt")]
    pub created_at: i64,
    #[sqlx(rename = "updatedAt")]
    pub updated_at: i64,
    /// Comma-joined tag names in insertion order.
    pub tags: Option<String>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        let tags = row
            .tags
            .filter(|t| !t.is_empty())
            .map(|t| t.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            id: row.id,
            title: row.title,
            url: row.url,
            favicon_url: row.favicon_url,
            tags,
            clicks: row.clicks.unwrap_or(0).max(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields accepted when creating a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    /// Client-assigned id; the server generates one when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
}

impl From<&Bookmark> for NewBookmark {
    fn from(b: &Bookmark) -> Self {
        Self {
            id: Some(b.id.clone()),
            title: b.title.clone(),
            url: b.url.clone(),
            tags: b.tags.clone(),
            favicon_url: b.favicon_url.clone(),
        }
    }
}

/// Fields accepted when editing a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkUpdate {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
}

impl From<&Bookmark> for BookmarkUpdate {
    fn from(b: &Bookmark) -> Self {
        Self {
            title: b.title.clone(),
            url: b.url.clone(),
            tags: b.tags.clone(),
            favicon_url: b.favicon_url.clone(),
        }
    }
}

/// Settings as exposed over the API: key to boolean.
pub type SettingsMap = BTreeMap<String, bool>;

/// Typed view of the settings the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub auto_detect_clipboard_links: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_detect_clipboard_links: true,
        }
    }
}

impl AppSettings {
    /// Read known keys from a settings map, defaulting missing ones.
    pub fn from_map(map: &SettingsMap) -> Self {
        let defaults = Self::default();
        Self {
            auto_detect_clipboard_links: map
                .get(AUTO_DETECT_CLIPBOARD_LINKS)
                .copied()
                .unwrap_or(defaults.auto_detect_clipboard_links),
        }
    }

    pub fn to_map(&self) -> SettingsMap {
        let mut map = SettingsMap::new();
        map.insert(
            AUTO_DETECT_CLIPBOARD_LINKS.to_string(),
            self.auto_detect_clipboard_links,
        );
        map
    }
}

/// Current time as Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

//! Ranking engine for the bookmark search box.
//!
//! Ranking is a pure function of the query and the bookmark collection:
//!
//! 1. queries shorter than [`MIN_QUERY_LEN`] characters yield nothing,
//! 2. bookmarks are kept when the query is a case-insensitive substring of the
//!    title, the URL, or any tag,
//! 3. if any kept bookmark has been opened, each gets a [`click_rating`] relative
//!    to the most-clicked match and the set is stably sorted by rating,
//! 4. the result is cut to [`MAX_RESULTS`].
//!
//! Ties keep the collection's order, so with no click history the window is
//! exactly the filtered collection.

use crate::db::Bookmark;

/// Minimum query length (in characters) before anything is matched.
pub const MIN_QUERY_LEN: usize = 2;

/// Size of the result window.
pub const MAX_RESULTS: usize = 8;

/// Highest click rating.
pub const MAX_RATING: u8 = 3;

/// Context for a single ranking pass
pub struct SearchContext<'a> {
    /// The raw query string
    pub query: &'a str,
    /// Query converted to lowercase
    pub query_lower: String,
}

impl<'a> SearchContext<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            query_lower: query.to_lowercase(),
        }
    }

    /// Whether the query is long enough to search at all.
    pub fn is_searchable(&self) -> bool {
        self.query.chars().count() >= MIN_QUERY_LEN
    }

    /// Substring match against title, URL, or any tag.
    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        let needle = self.query_lower.as_str();
        bookmark.title.to_lowercase().contains(needle)
            || bookmark.url.to_lowercase().contains(needle)
            || bookmark
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Discretize a click count against the window maximum into `0..=3`.
///
/// Returns 0 when `max_clicks` is not positive.
pub fn click_rating(clicks: i64, max_clicks: i64) -> u8 {
    if max_clicks <= 0 {
        return 0;
    }

    let ratio = clicks as f64 / max_clicks as f64;
    if ratio == 1.0 {
        3
    } else if ratio >= 0.67 {
        2
    } else if ratio >= 0.33 {
        1
    } else {
        0
    }
}

/// Rank bookmarks for a query and return the result window.
pub fn rank<'a>(query: &str, bookmarks: &'a [Bookmark]) -> Vec<&'a Bookmark> {
    let ctx = SearchContext::new(query);
    if !ctx.is_searchable() {
        return Vec::new();
    }

    let filtered: Vec<&Bookmark> = bookmarks.iter().filter(|b| ctx.matches(b)).collect();

    let has_clicks = filtered.iter().any(|b| b.clicks > 0);
    if !has_clicks {
        return filtered.into_iter().take(MAX_RESULTS).collect();
    }

    let max_clicks = filtered.iter().map(|b| b.clicks).max().unwrap_or(0);

    let mut rated: Vec<(u8, &Bookmark)> = filtered
        .into_iter()
        .map(|b| (click_rating(b.clicks, max_clicks), b))
        .collect();

    // `sort_by` is stable: equal ratings keep their filtered order.
    rated.sort_by(|a, b| b.0.cmp(&a.0));

    rated
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, b)| b)
        .collect()
}

/// Ratings of a window's rows against the window's own maximum, for display.
pub fn window_ratings(window: &[Bookmark]) -> Vec<u8> {
    let max_clicks = window.iter().map(|b| b.clicks).max().unwrap_or(0);
    window
        .iter()
        .map(|b| click_rating(b.clicks, max_clicks))
        .collect()
}

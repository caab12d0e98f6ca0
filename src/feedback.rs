//! Usage feedback: opening a result promotes it and demotes the rows that were
//! shown next to it.
//!
//! The store applies the update atomically (see [`crate::db::record_open`]);
//! this module holds the request shape, its validation, and the client-side
//! [`mirror`] applied after a successful round trip. The click total shrinks
//! over time since demotions floor at zero; that decay is intended.

use serde::{Deserialize, Serialize};

use crate::db::Bookmark;
use crate::error::{MarkError, MarkResult};
use crate::search::MAX_RESULTS;

/// Upper bound on `displayedIds`, matching the result window.
pub const MAX_DISPLAYED: usize = MAX_RESULTS;

/// Body of `POST /api/bookmarks/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    #[serde(default)]
    pub increment: bool,
    #[serde(default)]
    pub displayed_ids: Vec<String>,
}

impl OpenRequest {
    pub fn new(displayed_ids: Vec<String>) -> Self {
        Self {
            increment: true,
            displayed_ids,
        }
    }
}

/// Check the displayed set before anything is written.
pub fn validate(opened_id: &str, displayed_ids: &[String]) -> MarkResult<()> {
    if displayed_ids.is_empty() {
        return Err(MarkError::Validation(
            "Invalid displayed IDs: list is empty".to_string(),
        ));
    }
    if displayed_ids.len() > MAX_DISPLAYED {
        return Err(MarkError::Validation(format!(
            "Invalid displayed IDs: {} entries, at most {} allowed",
            displayed_ids.len(),
            MAX_DISPLAYED
        )));
    }
    if !displayed_ids.iter().any(|id| id == opened_id) {
        return Err(MarkError::Validation(format!(
            "Invalid displayed IDs: opened bookmark {} was not displayed",
            opened_id
        )));
    }
    Ok(())
}

/// Apply the store's counter deltas to an in-memory copy.
///
/// Only call this after the store accepted the update.
pub fn mirror(bookmarks: &mut [Bookmark], opened_id: &str, displayed_ids: &[String]) {
    for bookmark in bookmarks.iter_mut() {
        if bookmark.id == opened_id {
            bookmark.clicks += 1;
        } else if displayed_ids.iter().any(|id| *id == bookmark.id) {
            bookmark.clicks = (bookmark.clicks - 1).max(0);
        }
    }
}

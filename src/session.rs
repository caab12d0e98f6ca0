//! Headless client session.
//!
//! Holds everything the search page keeps in memory: the full bookmark list,
//! the query, the ranked result window, the selection, a pending delete and
//! whichever overlay is open. A front end feeds it queries, key presses and
//! pastes and renders what the accessors return.

use crate::client::BookmarkStore;
use crate::db::{AppSettings, Bookmark, BookmarkUpdate, NewBookmark};
use crate::error::{MarkError, MarkResult};
use crate::feedback;
use crate::link;
use crate::navigation::{Intent, Key, KeyInput, Selection, Transition};
use crate::search;

/// View drawn over the search page. Keyboard navigation is suspended while
/// one is open.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Editing { draft: Bookmark, is_new: bool },
    Settings,
    Manager,
}

/// What the front end should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Leave the page for this URL.
    Navigate(String),
    /// State changed; redraw.
    Handled,
    /// Nothing happened.
    Ignored,
}

pub struct Session<S: BookmarkStore> {
    store: S,
    bookmarks: Vec<Bookmark>,
    settings: AppSettings,
    query: String,
    window: Vec<Bookmark>,
    selection: Selection,
    /// Id of the row armed for deletion by a first Shift+Delete
    pending_delete: Option<String>,
    overlay: Overlay,
}

impl<S: BookmarkStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            bookmarks: Vec::new(),
            settings: AppSettings::default(),
            query: String::new(),
            window: Vec::new(),
            selection: Selection::new(),
            pending_delete: None,
            overlay: Overlay::None,
        }
    }

    /// Fetch bookmarks and settings. Failures are logged and the current
    /// values kept.
    pub async fn load(&mut self) {
        match self.store.list_bookmarks().await {
            Ok(bookmarks) => self.bookmarks = bookmarks,
            Err(e) => tracing::warn!("Failed to fetch bookmarks: {}", e),
        }

        match self.store.get_settings().await {
            Ok(map) => self.settings = AppSettings::from_map(&map),
            Err(e) => tracing::warn!("Failed to fetch settings: {}", e),
        }

        self.refresh_window();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn settings(&self) -> AppSettings {
        self.settings
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The current result window.
    pub fn results(&self) -> &[Bookmark] {
        &self.window
    }

    pub fn selected_index(&self) -> usize {
        self.selection.index()
    }

    pub fn selected(&self) -> Option<&Bookmark> {
        self.window.get(self.selection.index())
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Click rating (0-3) of each row in the window.
    pub fn ratings(&self) -> Vec<u8> {
        search::window_ratings(&self.window)
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn has_overlay(&self) -> bool {
        !matches!(self.overlay, Overlay::None)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pending_delete = None;
        self.refresh_window();
    }

    /// Re-rank against the current data. The selection always goes back to
    /// the first row.
    fn refresh_window(&mut self) {
        self.window = search::rank(&self.query, &self.bookmarks)
            .into_iter()
            .cloned()
            .collect();
        self.selection.reset();
        tracing::debug!(query = %self.query, results = self.window.len(), "window updated");
    }

    /// Handle one key press on the search page.
    pub async fn handle_key(&mut self, input: KeyInput) -> Outcome {
        if self.has_overlay() {
            return Outcome::Ignored;
        }

        if input.key == Key::Escape {
            return self.escape();
        }

        let before = self.selection.index();
        match self.selection.handle(self.window.len(), input) {
            Transition::Moved(index) => {
                if index != before {
                    self.pending_delete = None;
                }
                Outcome::Handled
            }
            Transition::Dispatch(Intent::Open(index)) => match self.open(index).await {
                Some(url) => Outcome::Navigate(url),
                None => Outcome::Ignored,
            },
            Transition::Dispatch(Intent::Edit(index)) => {
                self.start_edit(index);
                Outcome::Handled
            }
            Transition::Dispatch(Intent::Delete(index)) => {
                self.request_delete(index).await;
                Outcome::Handled
            }
            Transition::Ignored => Outcome::Ignored,
        }
    }

    fn escape(&mut self) -> Outcome {
        if self.pending_delete.take().is_some() {
            return Outcome::Handled;
        }
        if !self.query.is_empty() {
            self.set_query("");
            return Outcome::Handled;
        }
        Outcome::Ignored
    }

    /// Open the row at `index`: record the usage feedback and return its URL.
    ///
    /// The URL is returned even when recording fails; the local counters are
    /// only adjusted after the store accepted the update.
    pub async fn open(&mut self, index: usize) -> Option<String> {
        let bookmark = self.window.get(index)?;
        let opened_id = bookmark.id.clone();
        let url = bookmark.url.clone();
        let displayed_ids: Vec<String> = self.window.iter().map(|b| b.id.clone()).collect();

        match self.store.record_open(&opened_id, &displayed_ids).await {
            Ok(_) => {
                feedback::mirror(&mut self.bookmarks, &opened_id, &displayed_ids);
                self.refresh_window();
            }
            Err(e) => tracing::warn!("Failed to record open of {}: {}", opened_id, e),
        }

        Some(url)
    }

    fn start_edit(&mut self, index: usize) {
        let Some(bookmark) = self.window.get(index) else {
            return;
        };
        self.pending_delete = None;
        self.overlay = Overlay::Editing {
            draft: bookmark.clone(),
            is_new: false,
        };
    }

    async fn request_delete(&mut self, index: usize) {
        let Some(id) = self.window.get(index).map(|b| b.id.clone()) else {
            return;
        };

        if self.pending_delete.as_deref() != Some(id.as_str()) {
            self.pending_delete = Some(id);
            return;
        }

        self.pending_delete = None;
        if let Err(e) = self.delete_by_id(&id).await {
            tracing::warn!("Failed to delete {}: {}", id, e);
        }
    }

    /// Start a new bookmark from pasted text when it begins with a link.
    ///
    /// Returns whether an editor was opened.
    pub fn handle_paste(&mut self, text: &str) -> bool {
        if !self.settings.auto_detect_clipboard_links || self.has_overlay() {
            return false;
        }
        let Some(found) = link::detect_link(text) else {
            return false;
        };

        let url = link::normalize_url(found);
        let title = link::extract_domain_name(&url);
        let draft = Bookmark::new(uuid::Uuid::new_v4().to_string(), title, url);

        self.pending_delete = None;
        self.overlay = Overlay::Editing {
            draft,
            is_new: true,
        };
        true
    }

    /// Mutable access to the bookmark being edited.
    pub fn draft_mut(&mut self) -> Option<&mut Bookmark> {
        match &mut self.overlay {
            Overlay::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Persist the draft. On failure the editor stays open.
    pub async fn save_edit(&mut self) -> MarkResult<Bookmark> {
        let (draft, is_new) = match &self.overlay {
            Overlay::Editing { draft, is_new } => (draft.clone(), *is_new),
            _ => return Err(MarkError::Validation("No bookmark is being edited".to_string())),
        };

        let saved = if is_new {
            let saved = self
                .store
                .create_bookmark(&NewBookmark::from(&draft))
                .await?;
            self.bookmarks.insert(0, saved.clone());
            saved
        } else {
            let saved = self
                .store
                .update_bookmark(&draft.id, &BookmarkUpdate::from(&draft))
                .await?;
            if let Some(existing) = self.bookmarks.iter_mut().find(|b| b.id == saved.id) {
                *existing = saved.clone();
            }
            saved
        };

        self.overlay = Overlay::None;
        self.refresh_window();
        Ok(saved)
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.overlay, Overlay::Editing { .. }) {
            self.overlay = Overlay::None;
        }
    }

    pub fn open_settings(&mut self) {
        self.pending_delete = None;
        self.overlay = Overlay::Settings;
    }

    pub fn open_manager(&mut self) {
        self.pending_delete = None;
        self.overlay = Overlay::Manager;
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    pub async fn update_settings(&mut self, settings: AppSettings) -> MarkResult<()> {
        let saved = self.store.update_settings(&settings.to_map()).await?;
        self.settings = AppSettings::from_map(&saved);
        Ok(())
    }

    /// Delete immediately, without the two-step confirmation.
    pub async fn delete_by_id(&mut self, id: &str) -> MarkResult<()> {
        self.store.delete_bookmark(id).await?;

        self.bookmarks.retain(|b| b.id != id);
        if self.pending_delete.as_deref() == Some(id) {
            self.pending_delete = None;
        }
        self.refresh_window();
        Ok(())
    }
}

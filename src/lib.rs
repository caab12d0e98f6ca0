//! PureMark - search-first personal bookmark manager.
//!
//! Type to search saved links, paste a URL to add one, and let usage reorder
//! the results: opening a bookmark promotes it and demotes whatever was shown
//! next to it.
//!
//! # Architecture
//!
//! - [`search`] - Ranking engine (substring filter, click rating, stable sort)
//! - [`navigation`] - Keyboard selection state machine
//! - [`feedback`] - Usage feedback request, validation and client mirror
//! - [`db`] - SQLite store
//! - [`api`] - REST API (axum)
//! - [`client`] - Store access over HTTP or directly
//! - [`session`] - Headless search page controller
//! - [`config`] - Configuration loading and management
//!
//! # Example
//!
//! ```ignore
//! use puremark::client::HttpStore;
//! use puremark::session::Session;
//!
//! let mut session = Session::new(HttpStore::new("http://127.0.0.1:3000"));
//! session.load().await;
//! session.set_query("docs");
//! for bookmark in session.results() {
//!     println!("{} {}", bookmark.title, bookmark.url);
//! }
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod link;
pub mod navigation;
pub mod search;
pub mod server;
pub mod session;

pub use config::Config;
pub use db::{Bookmark, NewBookmark};
pub use error::{MarkError, MarkResult};
pub use search::rank;
pub use session::{Outcome, Session};

//! Client-side access to the bookmark store.
//!
//! [`BookmarkStore`] is what the [`Session`](crate::session::Session) talks to.
//! [`HttpStore`] goes through the REST API; [`LocalStore`] talks to a SQLite
//! pool in-process.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::future::Future;

use crate::db::{self, Bookmark, BookmarkUpdate, NewBookmark, SettingsMap};
use crate::error::{MarkError, MarkResult};
use crate::feedback::OpenRequest;

/// Operations the client needs from the store.
pub trait BookmarkStore {
    fn list_bookmarks(&self) -> impl Future<Output = MarkResult<Vec<Bookmark>>> + Send;

    fn create_bookmark(
        &self,
        new: &NewBookmark,
    ) -> impl Future<Output = MarkResult<Bookmark>> + Send;

    fn update_bookmark(
        &self,
        id: &str,
        update: &BookmarkUpdate,
    ) -> impl Future<Output = MarkResult<Bookmark>> + Send;

    fn delete_bookmark(&self, id: &str) -> impl Future<Output = MarkResult<()>> + Send;

    /// Run the usage feedback update and return the refreshed opened record.
    fn record_open(
        &self,
        opened_id: &str,
        displayed_ids: &[String],
    ) -> impl Future<Output = MarkResult<Bookmark>> + Send;

    fn get_settings(&self) -> impl Future<Output = MarkResult<SettingsMap>> + Send;

    fn update_settings(
        &self,
        settings: &SettingsMap,
    ) -> impl Future<Output = MarkResult<SettingsMap>> + Send;
}

/// Store reached over the REST API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpStore {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bookmark_url(&self, id: &str) -> String {
        format!("{}/api/bookmarks/{}", self.base_url, urlencoding::encode(id))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> MarkResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        Err(MarkError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

impl BookmarkStore for HttpStore {
    async fn list_bookmarks(&self) -> MarkResult<Vec<Bookmark>> {
        let response = self
            .client
            .get(format!("{}/api/bookmarks", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_bookmark(&self, new: &NewBookmark) -> MarkResult<Bookmark> {
        let response = self
            .client
            .post(format!("{}/api/bookmarks", self.base_url))
            .json(new)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_bookmark(&self, id: &str, update: &BookmarkUpdate) -> MarkResult<Bookmark> {
        let response = self
            .client
            .patch(self.bookmark_url(id))
            .json(update)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn delete_bookmark(&self, id: &str) -> MarkResult<()> {
        let response = self.client.delete(self.bookmark_url(id)).send().await?;
        let _: serde_json::Value = Self::parse(response).await?;
        Ok(())
    }

    async fn record_open(&self, opened_id: &str, displayed_ids: &[String]) -> MarkResult<Bookmark> {
        let response = self
            .client
            .post(self.bookmark_url(opened_id))
            .json(&OpenRequest::new(displayed_ids.to_vec()))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn get_settings(&self) -> MarkResult<SettingsMap> {
        let response = self
            .client
            .get(format!("{}/api/settings", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_settings(&self, settings: &SettingsMap) -> MarkResult<SettingsMap> {
        let response = self
            .client
            .patch(format!("{}/api/settings", self.base_url))
            .json(settings)
            .send()
            .await?;
        Self::parse(response).await
    }
}

/// Store backed directly by a SQLite pool.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl BookmarkStore for LocalStore {
    async fn list_bookmarks(&self) -> MarkResult<Vec<Bookmark>> {
        Ok(db::list_bookmarks(&self.pool).await?)
    }

    async fn create_bookmark(&self, new: &NewBookmark) -> MarkResult<Bookmark> {
        db::create_bookmark(&self.pool, new).await
    }

    async fn update_bookmark(&self, id: &str, update: &BookmarkUpdate) -> MarkResult<Bookmark> {
        db::update_bookmark(&self.pool, id, update).await
    }

    async fn delete_bookmark(&self, id: &str) -> MarkResult<()> {
        db::delete_bookmark(&self.pool, id).await
    }

    async fn record_open(&self, opened_id: &str, displayed_ids: &[String]) -> MarkResult<Bookmark> {
        db::record_open(&self.pool, opened_id, displayed_ids).await
    }

    async fn get_settings(&self) -> MarkResult<SettingsMap> {
        Ok(db::get_settings(&self.pool).await?)
    }

    async fn update_settings(&self, settings: &SettingsMap) -> MarkResult<SettingsMap> {
        let entries: Vec<(String, String)> = settings
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        Ok(db::upsert_settings(&self.pool, &entries).await?)
    }
}

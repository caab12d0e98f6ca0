//! Bookmark API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{ApiError, AppState, SuccessResponse};
use crate::db::{self, Bookmark, BookmarkUpdate, NewBookmark};
use crate::feedback::OpenRequest;

/// List bookmarks, newest first.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let bookmarks = db::list_bookmarks(&state.db).await?;
    Ok(Json(bookmarks))
}

/// Create a bookmark.
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewBookmark>, JsonRejection>,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    let Json(new) = payload?;
    let bookmark = db::create_bookmark(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// Record that a bookmark was opened from the result window.
///
/// Without `increment` this is a no-op.
pub async fn open(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<OpenRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    if !request.increment {
        return Ok(SuccessResponse::ok().into_response());
    }

    let bookmark = db::record_open(&state.db, &id, &request.displayed_ids).await?;
    Ok(Json(bookmark).into_response())
}

/// Update a bookmark's title, URL, favicon and tags.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<BookmarkUpdate>, JsonRejection>,
) -> Result<Json<Bookmark>, ApiError> {
    let Json(update) = payload?;
    let bookmark = db::update_bookmark(&state.db, &id, &update).await?;
    Ok(Json(bookmark))
}

/// Delete a bookmark.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    db::delete_bookmark(&state.db, &id).await?;
    Ok(SuccessResponse::ok())
}

//! Database export and import.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{ApiError, AppState, SuccessResponse};
use crate::db;

const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Download a snapshot of the store.
pub async fn export(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    if !state.database.allow_export {
        return Err(ApiError::Forbidden("Database export is disabled".to_string()));
    }

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("export.sqlite");
    db::export_snapshot(&state.db, &path).await?;
    let data = tokio::fs::read(&path).await?;

    let filename = format!(
        "puremark-db-{}.sqlite",
        chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S")
    );
    tracing::info!("Exporting database as {} ({} bytes)", filename, data.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/x-sqlite3".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}

/// Replace the store contents with an uploaded database file.
pub async fn import(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.database.allow_import {
        return Err(ApiError::Forbidden("Database import is disabled".to_string()));
    }

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            upload = Some((filename, data.to_vec()));
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    if !filename.ends_with(".sqlite") && !filename.ends_with(".db") {
        return Err(ApiError::BadRequest(
            "Invalid file type. Please upload a .sqlite or .db file".to_string(),
        ));
    }

    if !data.starts_with(SQLITE_HEADER) {
        return Err(ApiError::BadRequest(
            "Uploaded file is not a SQLite database".to_string(),
        ));
    }

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("import.sqlite");
    tokio::fs::write(&path, &data).await?;

    db::import_snapshot(&state.db, &path).await?;
    tracing::info!("Imported database from {} ({} bytes)", filename, data.len());

    Ok(SuccessResponse::ok())
}

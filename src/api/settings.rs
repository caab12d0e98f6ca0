//! Settings and server configuration handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::db::{self, SettingsMap};

/// Feature flags the client needs to decide what to show.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub allow_export: bool,
    pub allow_import: bool,
    pub db_prefill: bool,
}

/// Get all settings.
pub async fn get(State(state): State<Arc<AppState>>) -> Result<Json<SettingsMap>, ApiError> {
    let settings = db::get_settings(&state.db).await?;
    Ok(Json(settings))
}

/// Upsert the given keys and return the full settings map.
pub async fn update(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<SettingsMap>, ApiError> {
    let Json(body) = payload?;

    let entries: Vec<(String, String)> = body
        .into_iter()
        .map(|(key, value)| (key, stored_value(&value)))
        .collect();

    let settings = db::upsert_settings(&state.db, &entries).await?;
    Ok(Json(settings))
}

/// Server feature flags.
pub async fn config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        allow_export: state.database.allow_export,
        allow_import: state.database.allow_import,
        db_prefill: state.database.prefill,
    })
}

/// Settings are stored as text; strings are kept verbatim.
fn stored_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Config API HTTP handlers.
//!
//! CRUD over the in-memory policy store. Changes take effect on the
//! next playlist request and are not written back to the config file.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::models::SourceEntry;
use crate::policy::{PolicyUpdate, SourceUpdate};
use crate::web::AppState;
use crate::web::responses::{created, handle_error, handle_result, no_content, ok};

/// Get the full settings document
pub async fn get_settings(State(state): State<AppState>) -> Response {
    ok(state.policy.settings().await)
}

/// Update the global policy fields; the source table is edited through
/// the per-source routes
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<PolicyUpdate>,
) -> Response {
    ok(state.policy.update_policy(update).await)
}

/// List the source table
pub async fn list_sources(State(state): State<AppState>) -> Response {
    ok(state.policy.sources().await)
}

/// Add a source row
pub async fn add_source(
    State(state): State<AppState>,
    Json(entry): Json<SourceEntry>,
) -> Response {
    match state.policy.add_source(entry).await {
        Ok(added) => created(added),
        Err(err) => handle_error(err),
    }
}

/// Update one source row by key
pub async fn update_source(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(update): Json<SourceUpdate>,
) -> Response {
    handle_result(state.policy.update_source(&key, update).await)
}

/// Remove one source row by key
pub async fn remove_source(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.policy.remove_source(&key).await {
        Ok(()) => no_content(),
        Err(err) => handle_error(err),
    }
}

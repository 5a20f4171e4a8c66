//! Playlist output HTTP handlers.
//!
//! These routes return raw documents, not the JSON envelope: an M3U
//! playlist with download headers, or the plain-text diagnostics report
//! when `debug=1` is set. Failures come back as `ERROR: ...` plain text
//! with status 500 so media players surface something readable.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::errors::AppError;
use crate::models::OutputVariant;
use crate::pipeline;
use crate::policy::RequestOverrides;
use crate::web::AppState;

/// Full aggregation across every enabled source.
pub async fn merged_playlist(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    playlist_response(state, OutputVariant::Merged, params).await
}

/// Designated-source entries only.
pub async fn designated_playlist(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    playlist_response(state, OutputVariant::DesignatedOnly, params).await
}

/// Diagnostics report for the merged output, regardless of `debug`.
pub async fn directory_report(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let overrides = RequestOverrides::from_params(&params);
    let policy = effective_policy(&state, &overrides).await;

    match pipeline::run(
        state.fetcher.as_ref(),
        &policy,
        &state.categories,
        OutputVariant::Merged,
        true,
    )
    .await
    {
        Ok(report) => report_response(report),
        Err(err) => error_response(err),
    }
}

async fn playlist_response(
    state: AppState,
    variant: OutputVariant,
    params: HashMap<String, String>,
) -> Response {
    let overrides = RequestOverrides::from_params(&params);
    let cache_key = format!("/{}", variant.filename());
    // Overridden output is request-specific and the report is for live
    // inspection; neither may be served from or stored in the cache.
    let bypass_cache = overrides.debug || overrides.reshapes_policy();

    if !bypass_cache {
        if let Some(body) = state.cache.get(&cache_key).await {
            return document_response(&state, variant, body);
        }
    }

    let policy = effective_policy(&state, &overrides).await;
    match pipeline::run(
        state.fetcher.as_ref(),
        &policy,
        &state.categories,
        variant,
        overrides.debug,
    )
    .await
    {
        Ok(body) if overrides.debug => report_response(body),
        Ok(body) => {
            if !bypass_cache {
                state.cache.put(&cache_key, body.clone()).await;
            }
            document_response(&state, variant, body)
        }
        Err(err) => error_response(err),
    }
}

async fn effective_policy(
    state: &AppState,
    overrides: &RequestOverrides,
) -> crate::models::MergePolicy {
    let mut policy = state.policy.resolve().await;
    if overrides.reshapes_policy() {
        let table = state.policy.sources().await;
        overrides.apply(&mut policy, &table);
    }
    policy
}

fn document_response(state: &AppState, variant: OutputVariant, body: String) -> Response {
    let cache_control = format!(
        "public, max-age={}, s-maxage={}",
        state.config.cache.ttl.as_secs(),
        state.config.cache.shared_ttl.as_secs()
    );
    (
        [
            (
                header::CONTENT_TYPE,
                "application/x-mpegurl; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", variant.filename()),
            ),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response()
}

fn report_response(report: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        report,
    )
        .into_response()
}

fn error_response(err: AppError) -> Response {
    error!("Playlist request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("ERROR: {err}\n"),
    )
        .into_response()
}

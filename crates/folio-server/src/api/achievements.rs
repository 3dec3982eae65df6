use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use folio_core::{AchievementStats, PlatformDisplay, PlatformResult};
use serde::Serialize;

use super::{parse_category, ApiError, ApiResponse, AppState, CategoryQuery};
use crate::middleware::RequestId;
use crate::store::spawn_refresh;

#[derive(Debug, Serialize)]
pub(super) struct AchievementsData {
    loading: bool,
    fetched_at: Option<DateTime<Utc>>,
    results: AchievementStats,
}

#[derive(Debug, Serialize)]
pub(super) struct PlatformAchievementsData {
    name: String,
    slug: String,
    display: PlatformDisplay,
    loading: bool,
    fetched_at: Option<DateTime<Utc>>,
    /// `None` until the first sweep has been published.
    result: Option<PlatformResult>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshData {
    started: bool,
}

pub(super) async fn list_achievements(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&req_id.0, query.category.as_deref())?;
    // Flag first: it is cleared only after the snapshot is published.
    let loading = state.achievements.is_loading();
    let snapshot = state.achievements.snapshot().await;

    let results = snapshot.as_ref().map_or_else(AchievementStats::new, |s| {
        if category.is_none() {
            s.stats.clone()
        } else {
            s.stats.retain_names(
                state
                    .registry
                    .by_category(category)
                    .into_iter()
                    .map(|p| p.name()),
            )
        }
    });

    Ok(Json(ApiResponse::new(
        AchievementsData {
            loading,
            fetched_at: snapshot.map(|s| s.fetched_at),
            results,
        },
        req_id.0,
    )))
}

pub(super) async fn get_platform_achievements(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(platform) = state.registry.find(&slug) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("platform '{slug}' not found"),
        ));
    };

    let loading = state.achievements.is_loading();
    let snapshot = state.achievements.snapshot().await;
    let result = snapshot
        .as_ref()
        .and_then(|s| s.stats.get(platform.name()).cloned());

    Ok(Json(ApiResponse::new(
        PlatformAchievementsData {
            name: platform.name().to_string(),
            slug: platform.slug(),
            display: platform.display.clone(),
            loading,
            fetched_at: snapshot.map(|s| s.fetched_at),
            result,
        },
        req_id.0,
    )))
}

pub(super) async fn refresh_achievements(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    if !spawn_refresh(&state.achievements, Arc::clone(&state.registry)) {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "an achievements refresh is already running",
        ));
    }

    tracing::info!(request_id = %req_id.0, "achievements refresh started on demand");

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(RefreshData { started: true }, req_id.0)),
    ))
}

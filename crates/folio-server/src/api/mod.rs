mod achievements;
mod platforms;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use folio_core::{Category, PlatformsFile};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    request_id, require_bearer_auth, throttle_refresh, AuthState, RefreshThrottle, RequestId,
};
use crate::store::AchievementsStore;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PlatformsFile>,
    pub achievements: Arc<AchievementsStore>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    platforms: usize,
    last_refresh: Option<DateTime<Utc>>,
}

/// `?category=` filter shared by list endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct CategoryQuery {
    pub category: Option<String>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Parse an optional category filter, mapping bad input to a 400.
pub(super) fn parse_category(
    request_id: &str,
    raw: Option<&str>,
) -> Result<Option<Category>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
        None => Ok(None),
        Some(value) => value
            .parse::<Category>()
            .map(Some)
            .map_err(|reason| ApiError::new(request_id, "bad_request", reason)),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Auth runs before the throttle so rejected callers cannot use up the interval.
fn protected_router(auth: AuthState, throttle: RefreshThrottle) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/achievements/refresh",
            post(achievements::refresh_achievements),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    throttle,
                    throttle_refresh,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, throttle: RefreshThrottle) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/platforms", get(platforms::list_platforms))
        .route(
            "/api/v1/achievements",
            get(achievements::list_achievements),
        )
        .route(
            "/api/v1/achievements/{slug}",
            get(achievements::get_platform_achievements),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, throttle))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let last_refresh = state
        .achievements
        .snapshot()
        .await
        .map(|snapshot| snapshot.fetched_at);

    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            platforms: state.registry.platforms.len(),
            last_refresh,
        },
        req_id.0,
    ))
}

/// One on-demand sweep per ten seconds, roughly the request timeout.
pub fn default_refresh_throttle() -> RefreshThrottle {
    RefreshThrottle::new(Duration::from_secs(10))
}

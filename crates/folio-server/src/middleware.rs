//! Request tagging and guards for the on-demand refresh endpoint.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID carried as a request extension and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Who may trigger a refresh sweep.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No keys configured in development: every caller may refresh.
    Open,
    /// Only callers presenting one of these bearer tokens may refresh.
    Keys(Arc<HashSet<String>>),
}

impl AuthState {
    /// Builds the refresh guard from `FOLIO_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no keys are configured.
    pub fn from_config(config: &folio_core::AppConfig) -> anyhow::Result<Self> {
        Self::from_keys(config.api_keys.as_deref(), config.is_development())
    }

    /// Parses comma-separated bearer tokens.
    ///
    /// # Errors
    ///
    /// Fails when `raw` yields no tokens and `is_development` is false.
    pub fn from_keys(raw: Option<&str>, is_development: bool) -> anyhow::Result<Self> {
        let keys: HashSet<String> = raw
            .into_iter()
            .flat_map(|r| r.split(','))
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        match (keys.is_empty(), is_development) {
            (false, _) => Ok(Self::Keys(Arc::new(keys))),
            (true, true) => {
                tracing::warn!("FOLIO_API_KEYS unset; refresh endpoint is open in development");
                Ok(Self::Open)
            }
            (true, false) => anyhow::bail!(
                "FOLIO_API_KEYS must list at least one bearer token outside development"
            ),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    fn check(&self, headers: &HeaderMap) -> Result<(), &'static str> {
        let Self::Keys(keys) = self else {
            return Ok(());
        };
        match bearer_token(headers) {
            None => Err("missing bearer token"),
            Some(token) if keys.contains(token) => Ok(()),
            Some(_) => Err("invalid bearer token"),
        }
    }
}

/// Minimum spacing between accepted refresh triggers.
///
/// A sweep re-requests every platform endpoint, so callers are held to one
/// trigger per interval regardless of who sends it.
#[derive(Debug, Clone)]
pub struct RefreshThrottle {
    min_interval: Duration,
    last_accepted: Arc<Mutex<Option<Instant>>>,
}

impl RefreshThrottle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: Arc::new(Mutex::new(None)),
        }
    }

    /// Record a trigger at `now`, or return how long the caller must wait.
    async fn admit(&self, now: Instant) -> Result<(), Duration> {
        let mut last = self.last_accepted.lock().await;
        if let Some(prev) = *last {
            let since = now.saturating_duration_since(prev);
            if since < self.min_interval {
                return Err(self.min_interval - since);
            }
        }
        *last = Some(now);
        Ok(())
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Tags each request with an ID: the caller's `x-request-id` when it is a
/// short printable token, a fresh `UUIDv4` otherwise.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Rejects refresh triggers without an accepted bearer token.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    match auth.check(req.headers()) {
        Ok(()) => next.run(req).await,
        Err(reason) => {
            tracing::info!(reason, "refresh trigger rejected");
            ApiError::new(request_id_of(&req), "unauthorized", reason).into_response()
        }
    }
}

/// Rejects refresh triggers arriving inside the throttle interval.
pub async fn throttle_refresh(
    State(throttle): State<RefreshThrottle>,
    req: Request,
    next: Next,
) -> Response {
    match throttle.admit(Instant::now()).await {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            let retry_after = wait.as_secs().max(1);
            let mut res = ApiError::new(
                request_id_of(&req),
                "rate_limited",
                format!("refresh was triggered recently; retry in {retry_after}s"),
            )
            .into_response();
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            res
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use folio_core::{FallbackRecord, FieldMap, PlatformDisplay};
use serde::Serialize;

use super::{parse_category, ApiError, ApiResponse, AppState, CategoryQuery};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct PlatformItem {
    name: String,
    slug: String,
    endpoint: Option<String>,
    manual: bool,
    field_map: FieldMap,
    fallback: FallbackRecord,
    display: PlatformDisplay,
}

pub(super) async fn list_platforms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&req_id.0, query.category.as_deref())?;

    let items: Vec<PlatformItem> = state
        .registry
        .by_category(category)
        .into_iter()
        .map(|p| {
            let endpoint = p.descriptor.endpoint().map(ToOwned::to_owned);
            PlatformItem {
                name: p.name().to_string(),
                slug: p.slug(),
                manual: endpoint.is_none(),
                endpoint,
                field_map: p.descriptor.field_map.clone(),
                fallback: p.descriptor.fallback.clone(),
                display: p.display.clone(),
            }
        })
        .collect();

    Ok(Json(ApiResponse::new(items, req_id.0)))
}

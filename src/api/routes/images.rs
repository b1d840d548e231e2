//! Gallery metadata handler: forwards to the upstream feed and rewrites URLs.

use super::ImagesQuery;
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::Page;
use crate::upstream::{rewrite_page, validate_token};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

/// Default page size when the client does not specify one
const DEFAULT_PAGE_SIZE: usize = 50;

/// GET /api/images - One page of gallery metadata
///
/// Requires an `x-api-token` header; an optional `x-team-id` header scopes
/// the request to a team workspace. The token is validated for shape before
/// any upstream call is attempted. On success every item's image URLs are
/// rewritten into same-origin relay URLs.
#[utoipa::path(
    get,
    path = "/api/images",
    tag = "images",
    params(
        ("after" = Option<String>, Query, description = "Continuation cursor from the previous page"),
        ("limit" = Option<usize>, Query, description = "Page size (clamped to 1..=1000, default 50)")
    ),
    responses(
        (status = 200, description = "One page of image metadata", body = Page),
        (status = 401, description = "Missing or malformed API token", body = crate::error::ApiError),
        (status = 502, description = "Upstream rejected the token or failed", body = crate::error::ApiError)
    )
)]
pub async fn list_images(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ImagesQuery>,
) -> Result<Json<Page>> {
    let token = headers
        .get("x-api-token")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("Invalid API token".into()))?;
    validate_token(token)?;

    let team_id = headers
        .get("x-team-id")
        .and_then(|value| value.to_str().ok())
        .filter(|team| !team.is_empty());

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 1000);

    let page = state
        .upstream
        .recent_images(token, team_id, query.after.as_deref(), limit)
        .await?;

    tracing::debug!(
        items = page.items.len(),
        has_cursor = page.cursor.is_some(),
        limit,
        "forwarded metadata page"
    );

    Ok(Json(rewrite_page(page)))
}

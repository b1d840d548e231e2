//! Image relay handler: streams upstream image bytes to the browser.

use super::ProxyQuery;
use crate::api::AppState;
use crate::error::{Error, Result};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};

/// Content type assumed when the image origin does not send one
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// How long browsers may cache relayed images (24 hours)
const CACHE_CONTROL: &str = "public, max-age=86400";

/// GET /proxy/image - Relay raw image bytes from an upstream origin
///
/// The body is streamed through unmodified, preserving the upstream
/// content-type. Responses are marked cacheable for 24 hours and
/// cross-origin-readable so canvas/ZIP consumers can read the bytes.
#[utoipa::path(
    get,
    path = "/proxy/image",
    tag = "proxy",
    params(
        ("url" = String, Query, description = "Absolute URL of the upstream image")
    ),
    responses(
        (status = 200, description = "Raw image bytes with upstream content-type"),
        (status = 400, description = "Missing url parameter", body = crate::error::ApiError),
        (status = 502, description = "Upstream fetch failed", body = crate::error::ApiError)
    )
)]
pub async fn relay_image(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response> {
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::BadRequest("Missing image URL".into()))?;

    let upstream = state
        .http
        .get(&url)
        .send()
        .await
        .map_err(|e| Error::BadGateway(format!("failed to fetch image: {e}")))?;

    let status = upstream.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), url = %url, "image origin returned error");
        return Err(Error::BadGateway(format!(
            "image origin returned status {}",
            status.as_u16()
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| Error::ApiServerError(e.to_string()))
}

//! System handlers: health, OpenAPI, and the static page document.

use crate::api::AppState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
    Json,
};
use serde_json::json;

/// Built-in minimal page served when no static directory is configured
const BUILTIN_PAGE: &str = "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>gallery-relay</title></head>\n<body>\n<h1>gallery-relay</h1>\n<p>No static page configured. Point <code>server.static_dir</code> at a directory containing index.html.</p>\n</body>\n</html>\n";

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// GET / - The static page document
///
/// Serves index.html from the configured static directory, falling back to a
/// built-in minimal page when the directory is unset or unreadable.
pub async fn index_page(State(state): State<AppState>) -> Html<String> {
    if let Some(dir) = &state.config.server.static_dir {
        let path = dir.join("index.html");
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => return Html(contents),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read static page, serving built-in");
            }
        }
    }
    Html(BUILTIN_PAGE.to_string())
}

/// Fallback handler: any `*.html` path serves the page document, everything
/// else is a JSON 404.
pub async fn static_fallback(State(state): State<AppState>, uri: Uri) -> axum::response::Response {
    if uri.path().ends_with(".html") {
        return index_page(State(state)).await.into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Not found"})),
    )
        .into_response()
}

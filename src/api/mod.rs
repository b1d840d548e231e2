//! Relay API server module
//!
//! Exposes the three relay endpoints plus health and OpenAPI documentation.

use crate::{Config, Result};
use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the relay router with all route definitions
///
/// # Routes
///
/// ## Gallery
/// - `GET /api/images` - One page of metadata (headers: `x-api-token`, optional `x-team-id`)
/// - `GET /proxy/image` - Relay raw image bytes from an upstream origin
///
/// ## Static page
/// - `GET /` - The page document
/// - `GET /*.html` - Also the page document (fallback)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(config: Arc<Config>) -> Router {
    let state = AppState::new(config.clone());

    let router = Router::new()
        .route("/api/images", get(routes::list_images))
        .route("/proxy/image", get(routes::relay_image))
        .route("/", get(routes::index_page))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .fallback(routes::static_fallback);

    // Merge Swagger UI routes if enabled in config (before applying state).
    // SwaggerUi serves its own spec copy at /api/openapi.json; /openapi.json
    // above stays the canonical route
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Add state to all routes, then request tracing
    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Allows the specified origins (or any, when "*" is present), all methods,
/// and all headers for cross-origin requests.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the relay server on the configured bind address.
///
/// Creates a TCP listener, binds it to `server.bind_address`, and serves the
/// relay router until the server is shut down.
///
/// # Example
///
/// ```no_run
/// use gallery_relay::Config;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
///
/// // Start the relay server (blocks until shutdown)
/// gallery_relay::api::start_api_server(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(config: Arc<Config>) -> Result<()> {
    config.validate()?;

    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting relay server"
    );

    let app = create_router(config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "Relay server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("Relay server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the relay API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the gallery-relay API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "gallery-relay API",
        version = "0.1.0",
        description = "Relay API for browsing and exporting chat-generated image galleries",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local relay server")
    ),
    paths(
        crate::api::routes::list_images,
        crate::api::routes::relay_image,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::Page,
            crate::types::ImageRecord,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "images", description = "Paginated gallery metadata"),
        (name = "proxy", description = "Raw image byte relaying"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;

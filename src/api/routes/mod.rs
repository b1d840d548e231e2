//! Route handlers for the relay API
//!
//! Handlers are organized by domain:
//! - [`images`] — Paginated gallery metadata
//! - [`proxy`] — Raw image byte relaying
//! - [`system`] — Health, OpenAPI, static page

use serde::{Deserialize, Serialize};

mod images;
mod proxy;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use images::*;
pub use proxy::*;
pub use system::*;

// ============================================================================
// Query Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /api/images
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ImagesQuery {
    /// Continuation cursor from the previous page
    pub after: Option<String>,
    /// Page size (clamped to 1..=1000, default: 50)
    pub limit: Option<usize>,
}

/// Query parameters for GET /proxy/image
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProxyQuery {
    /// Absolute URL of the upstream image to relay
    pub url: Option<String>,
}

//! Configuration types for gallery-relay

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};
use utoipa::ToSchema;

/// Relay server configuration (bind address, CORS, static page)
///
/// Groups settings for the HTTP surface of the relay.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Address the API server binds to (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS middleware (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins ("*" for any, default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,

    /// Directory containing the static page document (index.html)
    ///
    /// When unset, a built-in minimal page is served instead.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
            static_dir: None,
        }
    }
}

/// Upstream chat-image API configuration
///
/// The relay forwards metadata requests to
/// `{base_url}{images_path}?after=<cursor>&limit=<n>` with a bearer token and
/// an optional tenant-scoping header.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API (default: "https://chat.example.com")
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// Path of the cursor-paginated recent-images feed
    /// (default: "/api/my/recent/images")
    #[serde(default = "default_images_path")]
    pub images_path: String,

    /// Name of the tenant-scoping header forwarded upstream when the client
    /// supplies a team id (default: "x-account-id")
    #[serde(default = "default_team_header")]
    pub team_header: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            images_path: default_images_path(),
            team_header: default_team_header(),
        }
    }
}

/// Client-side loop configuration (page sizes and chunk concurrency)
///
/// These bound the pagination and export loops; they are deliberately small
/// fixed limits, not a dynamic backpressure mechanism.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientConfig {
    /// Page size for interactive browsing (1..=1000, default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Page size for export metadata collection (1..=1000, default: 100)
    #[serde(default = "default_export_page_size")]
    pub export_page_size: usize,

    /// Concurrent thumbnail fetches per chunk (default: 6)
    #[serde(default = "default_thumbnail_concurrency")]
    pub thumbnail_concurrency: usize,

    /// Concurrent image downloads per export chunk (default: 8)
    #[serde(default = "default_export_concurrency")]
    pub export_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            export_page_size: default_export_page_size(),
            thumbnail_concurrency: default_thumbnail_concurrency(),
            export_concurrency: default_export_concurrency(),
        }
    }
}

/// Main configuration for gallery-relay
///
/// Fields are organized into logical sub-configs:
/// - [`server`](ServerConfig) — bind address, CORS, static page
/// - [`upstream`](UpstreamConfig) — upstream API location and headers
/// - [`client`](ClientConfig) — pagination and export loop bounds
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Relay server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Client loop settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Validate the configuration, returning the first problem found
    ///
    /// Checks that the upstream base URL parses, that page sizes are within
    /// the 1..=1000 window, and that chunk concurrency limits are non-zero.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.upstream.base_url).is_err() {
            return Err(Error::Config {
                message: format!("invalid upstream base URL: {}", self.upstream.base_url),
                key: Some("upstream.base_url".into()),
            });
        }

        if !self.upstream.images_path.starts_with('/') {
            return Err(Error::Config {
                message: "upstream images path must start with '/'".into(),
                key: Some("upstream.images_path".into()),
            });
        }

        for (value, key) in [
            (self.client.page_size, "client.page_size"),
            (self.client.export_page_size, "client.export_page_size"),
        ] {
            if !(1..=1000).contains(&value) {
                return Err(Error::Config {
                    message: format!("page size {value} outside 1..=1000"),
                    key: Some(key.into()),
                });
            }
        }

        for (value, key) in [
            (
                self.client.thumbnail_concurrency,
                "client.thumbnail_concurrency",
            ),
            (self.client.export_concurrency, "client.export_concurrency"),
        ] {
            if value == 0 {
                return Err(Error::Config {
                    message: "chunk concurrency must be at least 1".into(),
                    key: Some(key.into()),
                });
            }
        }

        Ok(())
    }
}

fn default_bind_address() -> SocketAddr {
    // Safe: a literal address
    #[allow(clippy::expect_used)]
    "127.0.0.1:3000"
        .parse()
        .expect("default bind address is valid")
}

pub(crate) fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_upstream_base_url() -> String {
    "https://chat.example.com".to_string()
}

fn default_images_path() -> String {
    "/api/my/recent/images".to_string()
}

fn default_team_header() -> String {
    "x-account-id".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_export_page_size() -> usize {
    100
}

fn default_thumbnail_concurrency() -> usize {
    6
}

fn default_export_concurrency() -> usize {
    8
}

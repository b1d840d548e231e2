//! Application state for the API server

use crate::upstream::UpstreamClient;
use crate::Config;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc/client clones) and
/// provides access to the upstream client, the shared HTTP connection pool,
/// and configuration.
#[derive(Clone)]
pub struct AppState {
    /// Client for the upstream metadata feed
    pub upstream: UpstreamClient,

    /// Shared HTTP connection pool (image relaying)
    pub http: reqwest::Client,

    /// Configuration (read-only at runtime)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// One reqwest client backs both the metadata forwarder and the image
    /// relay so upstream connections are pooled.
    pub fn new(config: Arc<Config>) -> Self {
        let http = reqwest::Client::new();
        let upstream = UpstreamClient::with_client(http.clone(), config.upstream.clone());
        Self {
            upstream,
            http,
            config,
        }
    }
}

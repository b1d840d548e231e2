//! Browser-equivalent clients for the relay API
//!
//! The original single-page client drives the relay with two loops: an
//! interactive pagination loop that renders thumbnails, and a bulk-export
//! loop that downloads every image into a ZIP archive. This module
//! re-expresses both as async library clients over [`GalleryClient`].
//!
//! Consumers subscribe to [`Event`](crate::types::Event)s for progress; no
//! polling required.

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::settings::Settings;
use crate::types::{Event, Page};
use bytes::Bytes;
use std::sync::atomic::AtomicBool;
use tokio::sync::broadcast;

pub mod concurrency;
pub mod export;
pub mod filename;
pub mod pagination;

pub use export::{ExportArchive, ExportJob, ExportOptions};
pub use pagination::PaginationSession;

/// Event channel capacity; slow subscribers lag rather than block the loops
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Client for the relay API
///
/// Holds the shared HTTP connection pool, the event bus, and the in-flight
/// guard that prevents overlapping pagination loops from the same trigger.
#[derive(Debug)]
pub struct GalleryClient {
    http: reqwest::Client,
    base_url: String,
    config: ClientConfig,
    in_flight: AtomicBool,
    event_tx: broadcast::Sender<Event>,
}

impl GalleryClient {
    /// Create a client for the relay at `base_url` with default loop bounds
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a client with explicit loop bounds
    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
            in_flight: AtomicBool::new(false),
            event_tx,
        }
    }

    /// Subscribe to pagination and export events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Base URL of the relay this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Loop bounds in effect for this client
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn emit(&self, event: Event) {
        // Nobody listening is fine
        let _ = self.event_tx.send(event);
    }

    pub(crate) fn in_flight_guard(&self) -> &AtomicBool {
        &self.in_flight
    }

    /// Resolve a possibly-relative relay URL against the base URL
    pub(crate) fn absolute_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }

    /// Fetch one metadata page from the relay
    ///
    /// Sends the settings' token and team id as headers. Relay errors are
    /// surfaced with the message from the JSON error body when one is
    /// present; never retried.
    pub async fn fetch_page(
        &self,
        settings: &Settings,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Page> {
        let mut request = self
            .http
            .get(format!("{}/api/images", self.base_url))
            .header("x-api-token", &settings.api_token)
            .query(&[("limit", limit.to_string())]);

        if let Some(cursor) = after {
            request = request.query(&[("after", cursor)]);
        }
        if let Some(team) = settings.team_id.as_deref().filter(|t| !t.is_empty()) {
            request = request.header("x-team-id", team);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ApiError>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("relay returned status {}", status.as_u16()));

            return Err(match status.as_u16() {
                401 => Error::Unauthorized(message),
                400 => Error::BadRequest(message),
                _ => Error::BadGateway(message),
            });
        }

        Ok(response.json::<Page>().await?)
    }

    /// Fetch raw bytes from a relay (or absolute) URL
    ///
    /// Returns the body and the response content-type, when present.
    pub(crate) async fn fetch_bytes(&self, url: &str) -> Result<(Bytes, Option<String>)> {
        let response = self.http.get(self.absolute_url(url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::BadGateway(format!(
                "image fetch returned status {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let bytes = response.bytes().await?;
        Ok((bytes, content_type))
    }
}

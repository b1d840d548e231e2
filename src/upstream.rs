//! Upstream chat-image API client and relay-URL rewriting
//!
//! The relay shields the upstream credential from the browser: metadata
//! requests are forwarded with a bearer token, and every image URL in the
//! response is rewritten into a same-origin `/proxy/image` URL carrying the
//! original URL as a query-encoded parameter. The rewriting is a pure
//! deterministic encoding of the original URL.

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use crate::types::{ImageRecord, Page, UpstreamPage};

/// Minimum accepted token length
const MIN_TOKEN_LEN: usize = 10;

/// Validate the bearer token format before any upstream call is attempted
///
/// The token must be at least 10 characters and contain no whitespace.
/// Violations are rejected with [`Error::Unauthorized`] carrying the exact
/// message the relay puts on the wire.
pub fn validate_token(token: &str) -> Result<()> {
    if token.len() < MIN_TOKEN_LEN || token.chars().any(char::is_whitespace) {
        return Err(Error::Unauthorized("Invalid API token".into()));
    }
    Ok(())
}

/// Rewrite an absolute upstream URL into a same-origin relay URL
///
/// `http://x/a.png` becomes `/proxy/image?url=http%3A%2F%2Fx%2Fa.png`.
#[must_use]
pub fn relay_url(original: &str) -> String {
    format!("/proxy/image?url={}", urlencoding::encode(original))
}

/// Recover the original upstream URL from a relay URL
///
/// Inverse of [`relay_url`]. Returns `None` when the input is not a relay
/// URL or the embedded parameter does not decode.
#[must_use]
pub fn original_url(relayed: &str) -> Option<String> {
    let encoded = relayed.strip_prefix("/proxy/image?url=")?;
    urlencoding::decode(encoded).ok().map(|url| url.into_owned())
}

/// Convert an upstream page into the relay's wire shape
///
/// Item order and the cursor pass through unchanged; only the image URLs are
/// rewritten to point back through the relay.
#[must_use]
pub fn rewrite_page(page: UpstreamPage) -> Page {
    let items = page
        .items
        .into_iter()
        .map(|item| {
            let thumbnail_url = item.thumbnail_path().map(relay_url);
            ImageRecord {
                url: relay_url(&item.url),
                thumbnail_url,
                id: item.id,
                title: item.title.unwrap_or_default(),
                created_at: item.created_at,
                width: item.width,
                height: item.height,
            }
        })
        .collect();

    Page {
        items,
        cursor: page.cursor,
    }
}

/// Client for the upstream cursor-paginated recent-images feed
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a client with a fresh HTTP connection pool
    pub fn new(config: UpstreamConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing HTTP connection pool
    pub fn with_client(http: reqwest::Client, config: UpstreamConfig) -> Self {
        Self { http, config }
    }

    /// Fetch one page of the recent-images feed
    ///
    /// Attaches `Authorization: Bearer <token>` and, when a team id is given,
    /// the configured tenant-scoping header. Upstream 401/403 map to
    /// [`Error::UpstreamRejected`], any other non-2xx status to
    /// [`Error::UpstreamError`]. Never retried.
    pub async fn recent_images(
        &self,
        token: &str,
        team_id: Option<&str>,
        after: Option<&str>,
        limit: usize,
    ) -> Result<UpstreamPage> {
        let url = format!("{}{}", self.config.base_url, self.config.images_path);

        let mut request = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit.to_string())]);

        if let Some(cursor) = after {
            request = request.query(&[("after", cursor)]);
        }
        if let Some(team) = team_id {
            request = request.header(&self.config.team_header, team);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            tracing::warn!(status = status.as_u16(), "upstream rejected credentials");
            return Err(Error::UpstreamRejected {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "upstream request failed");
            return Err(Error::UpstreamError {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<UpstreamPage>().await?)
    }
}

//! Core types and events for gallery-relay

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single gallery image as served by the relay
///
/// Immutable once received from upstream; the relay only rewrites the image
/// URLs so they point back through `/proxy/image`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageRecord {
    /// Upstream identifier, unique per item
    pub id: String,

    /// Display title (may be empty)
    #[serde(default)]
    pub title: String,

    /// Creation timestamp, upstream epoch seconds
    pub created_at: i64,

    /// Pixel width
    pub width: u32,

    /// Pixel height
    pub height: u32,

    /// Relayed full-image URL (`/proxy/image?url=...`)
    pub url: String,

    /// Relayed thumbnail URL, absent when upstream omits a thumbnail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// One page of gallery metadata
///
/// Cursor presence signals more pages exist; an empty-items page with no
/// cursor signals exhaustion.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Page {
    /// Ordered image records, as returned by upstream
    pub items: Vec<ImageRecord>,

    /// Opaque continuation token for the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Page {
    /// Whether this page signals that more pages exist
    ///
    /// An empty-but-cursored page is treated as terminal: without upstream
    /// guarantees it cannot be told apart from end-of-feed, and the single
    /// attempt policy forbids probing again.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor.is_some() && !self.items.is_empty()
    }
}

// ============================================================================
// Upstream wire types
// ============================================================================

/// One page of the upstream recent-images feed, as received over the wire
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpstreamPage {
    /// Items in upstream order
    #[serde(default)]
    pub items: Vec<UpstreamImage>,

    /// Continuation token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A single upstream image item
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpstreamImage {
    /// Upstream identifier
    pub id: String,

    /// Absolute URL of the full image on the upstream origin
    pub url: String,

    /// Pixel width
    pub width: u32,

    /// Pixel height
    pub height: u32,

    /// Display title; upstream may omit it entirely
    #[serde(default)]
    pub title: Option<String>,

    /// Creation timestamp, epoch seconds
    pub created_at: i64,

    /// Alternate encodings (thumbnail and friends)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encodings: Option<Encodings>,
}

impl UpstreamImage {
    /// The thumbnail source URL, when upstream provides one
    #[must_use]
    pub fn thumbnail_path(&self) -> Option<&str> {
        self.encodings
            .as_ref()
            .and_then(|e| e.thumbnail.as_ref())
            .map(|t| t.path.as_str())
    }
}

/// Alternate encodings attached to an upstream item
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Encodings {
    /// Thumbnail encoding, if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailEncoding>,
}

/// Thumbnail encoding entry
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ThumbnailEncoding {
    /// Absolute URL of the thumbnail on the upstream origin
    pub path: String,
}

// ============================================================================
// Client events
// ============================================================================

/// Events emitted by the pagination and export clients
///
/// Consumers subscribe via [`GalleryClient::subscribe`](crate::client::GalleryClient::subscribe);
/// no polling required.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A metadata page was loaded during interactive browsing
    PageLoaded {
        /// Items on this page
        count: usize,
        /// Running total across the walk
        total: usize,
    },

    /// A thumbnail fetch failed and the item degraded to a placeholder
    ThumbnailFailed {
        /// Id of the affected item
        id: String,
    },

    /// An export job started
    ExportStarted,

    /// Export metadata collection progress (phase 1)
    ExportCollecting {
        /// Pages fetched so far
        pages: usize,
        /// Items collected so far
        collected: usize,
        /// Overall progress fraction, 0.0..=1.0
        percent: f32,
    },

    /// Export image download progress (phase 3), reported after every chunk
    ExportProgress {
        /// Overall progress fraction, 0.0..=1.0
        percent: f32,
        /// Downloads attempted so far
        attempted: usize,
        /// Downloads succeeded so far
        downloaded: usize,
        /// Total items in the export
        total: usize,
    },

    /// Export finished and the archive is ready
    ExportComplete {
        /// Generated archive filename
        filename: String,
        /// Images included in the archive
        downloaded: usize,
        /// Total items the export attempted
        total: usize,
    },

    /// Export aborted with an error
    ExportFailed {
        /// User-visible failure message
        message: String,
    },
}

//! Cursor-based page walking and thumbnail prefetching
//!
//! The walk is strictly sequential: one page in flight at a time, cursors
//! followed in order, so upstream metadata ordering is preserved. Thumbnail
//! fetching for a delivered page fans out in bounded chunks and degrades
//! per item instead of aborting the walk.

use super::concurrency::map_chunked;
use super::GalleryClient;
use crate::error::{Error, Result};
use crate::settings::{Settings, SettingsProvider};
use crate::types::{Event, ImageRecord};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-invocation pagination state
///
/// Each walk owns its own session; there is no shared mutable cursor.
#[derive(Clone, Debug, Default)]
pub struct PaginationSession {
    /// Continuation token from the last page, if any
    pub cursor: Option<String>,
    /// Whether another page should be requested
    pub has_more: bool,
    /// Items seen so far
    pub total: usize,
    /// Pages fetched so far
    pub pages: usize,
}

impl PaginationSession {
    /// A fresh session positioned before the first page
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor: None,
            has_more: true,
            total: 0,
            pages: 0,
        }
    }

    /// Advance past a fetched page
    pub fn advance(&mut self, page: &crate::types::Page) {
        self.pages += 1;
        self.total += page.items.len();
        self.has_more = page.has_more();
        self.cursor = page.cursor.clone();
    }
}

/// Releases the in-flight flag when the walk ends, even on error
pub(super) struct InFlightGuard<'a>(pub(super) &'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GalleryClient {
    /// Walk the metadata feed to exhaustion, handing each non-empty page to
    /// `on_page`
    ///
    /// Uses the settings snapshot taken at call time; the batch size is
    /// clamped to 1..=1000. Any request failure halts the walk and surfaces
    /// that error — there is no retry. Returns the total item count.
    ///
    /// A second call while a walk is in progress fails with [`Error::Busy`];
    /// this mirrors the single in-flight guard that keeps a re-triggered UI
    /// from starting overlapping loops.
    pub async fn load_all<F>(&self, settings: &Settings, mut on_page: F) -> Result<usize>
    where
        F: FnMut(&[ImageRecord]),
    {
        if self
            .in_flight_guard()
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy("gallery load already in progress".into()));
        }
        let _guard = InFlightGuard(self.in_flight_guard());

        let limit = settings.clamped_batch_size();
        let mut session = PaginationSession::new();

        while session.has_more {
            let page = self
                .fetch_page(settings, session.cursor.as_deref(), limit)
                .await?;
            session.advance(&page);

            if !page.items.is_empty() {
                self.emit(Event::PageLoaded {
                    count: page.items.len(),
                    total: session.total,
                });
                on_page(&page.items);
            }
        }

        tracing::debug!(
            total = session.total,
            pages = session.pages,
            "pagination walk complete"
        );
        Ok(session.total)
    }

    /// Like [`load_all`](Self::load_all), snapshotting settings from a
    /// provider at call time
    pub async fn load_all_from<P, F>(&self, provider: &P, on_page: F) -> Result<usize>
    where
        P: SettingsProvider + ?Sized,
        F: FnMut(&[ImageRecord]),
    {
        let settings = provider.get().await;
        self.load_all(&settings, on_page).await
    }

    /// Fetch thumbnails for a delivered page in bounded chunks
    ///
    /// Runs at most `client.thumbnail_concurrency` fetches at once. A failed
    /// thumbnail falls back to the full-image URL; if that also fails the
    /// slot is `None` (the UI shows a placeholder) and the walk continues.
    /// Results are positionally aligned with `items`.
    pub async fn prefetch_thumbnails(&self, items: &[ImageRecord]) -> Vec<Option<Bytes>> {
        let targets: Vec<(String, Option<String>, String)> = items
            .iter()
            .map(|item| (item.id.clone(), item.thumbnail_url.clone(), item.url.clone()))
            .collect();

        let outcomes = map_chunked(
            targets,
            self.config().thumbnail_concurrency,
            |(id, thumbnail_url, full_url)| async move {
                // Prefer the thumbnail, degrade to the full image
                if let Some(thumb) = thumbnail_url {
                    match self.fetch_bytes(&thumb).await {
                        Ok((bytes, _)) => return Ok(bytes),
                        Err(e) => {
                            tracing::debug!(id = %id, error = %e, "thumbnail fetch failed, trying full image");
                        }
                    }
                }
                match self.fetch_bytes(&full_url).await {
                    Ok((bytes, _)) => Ok(bytes),
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "image fetch failed, showing placeholder");
                        self.emit(Event::ThumbnailFailed { id });
                        Err(e)
                    }
                }
            },
        )
        .await;

        outcomes.into_iter().map(|r| r.ok()).collect()
    }
}

//! Bulk export: collect every image and assemble a ZIP archive in memory
//!
//! An export runs in phases. Metadata collection walks the feed at the
//! export page size; downloads then fan out in bounded chunks through the
//! relay; finally the archive is assembled with one entry per downloaded
//! image plus an optional `metadata.json` manifest. Progress is reported on
//! the client's event bus after every page and every chunk.
//!
//! A per-image download failure skips that image; the export only aborts
//! when metadata collection fails, the feed is empty, or nothing at all
//! downloads.

use super::concurrency::map_chunked_with;
use super::filename::{archive_filename, image_filename};
use super::pagination::{InFlightGuard, PaginationSession};
use super::GalleryClient;
use crate::error::{Error, Result};
use crate::settings::{Settings, SettingsProvider};
use crate::types::{Event, ImageRecord};
use crate::upstream::original_url;
use chrono::Utc;
use serde::Serialize;
use std::io::{Cursor, Write};
use std::sync::atomic::Ordering;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Manifest entry name inside the archive
const MANIFEST_NAME: &str = "metadata.json";

/// Progress granted per metadata page during collection
const COLLECT_STEP: f32 = 0.02;

/// Progress ceiling for the collection phase; downloads fill the rest
const COLLECT_CAP: f32 = 0.10;

/// Tunables for a single export run
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Write a `metadata.json` manifest into the archive
    pub include_metadata: bool,

    /// Metadata page size for the collection walk
    pub page_size: usize,

    /// Concurrent image downloads per chunk
    pub concurrency: usize,

    /// Name the archive as a team export rather than a personal one
    pub team_scope: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_metadata: true,
            page_size: 100,
            concurrency: 8,
            team_scope: false,
        }
    }
}

/// A finished export, ready to hand to the user
#[derive(Clone, Debug)]
pub struct ExportArchive {
    /// Suggested download filename, e.g. `chat-images-personal-20240601-120000.zip`
    pub filename: String,

    /// The complete ZIP archive
    pub bytes: Vec<u8>,

    /// Images included in the archive
    pub downloaded: usize,

    /// Images the export attempted to download
    pub attempted: usize,
}

/// Manifest written as `metadata.json` when enabled
#[derive(Serialize)]
struct Manifest {
    exported_at: String,
    count: usize,
    images: Vec<ManifestEntry>,
}

/// One manifest row
///
/// URLs are the upstream originals, recovered from the relayed form the
/// records carry. A URL that is not relay-shaped passes through verbatim.
#[derive(Serialize)]
struct ManifestEntry {
    id: String,
    title: String,
    created_at: i64,
    width: u32,
    height: u32,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
}

impl From<&ImageRecord> for ManifestEntry {
    fn from(record: &ImageRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            created_at: record.created_at,
            width: record.width,
            height: record.height,
            url: original_url(&record.url).unwrap_or_else(|| record.url.clone()),
            thumbnail_url: record
                .thumbnail_url
                .as_deref()
                .map(|thumb| original_url(thumb).unwrap_or_else(|| thumb.to_string())),
        }
    }
}

/// One bulk export run
///
/// Built by [`GalleryClient::export`]; consumed by [`run`](Self::run).
#[derive(Debug)]
pub struct ExportJob<'a> {
    client: &'a GalleryClient,
    settings: Settings,
    options: ExportOptions,
}

impl GalleryClient {
    /// Prepare an export using the given settings snapshot
    ///
    /// Page size and concurrency come from the client config; the manifest
    /// toggle and archive scope come from the settings. Override either with
    /// [`ExportJob::with_options`].
    pub fn export(&self, settings: &Settings) -> ExportJob<'_> {
        let options = ExportOptions {
            include_metadata: settings.include_metadata,
            page_size: self.config().export_page_size,
            concurrency: self.config().export_concurrency,
            team_scope: settings.is_team_scoped(),
        };
        ExportJob {
            client: self,
            settings: settings.clone(),
            options,
        }
    }

    /// Prepare an export from a settings provider
    ///
    /// Takes the snapshot at call time; provider edits made after this point
    /// apply from the next export.
    pub async fn export_from<P>(&self, provider: &P) -> ExportJob<'_>
    where
        P: SettingsProvider + ?Sized,
    {
        let settings = provider.get().await;
        self.export(&settings)
    }
}

impl ExportJob<'_> {
    /// Replace the derived options for this run
    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the export to completion
    ///
    /// Fails with [`Error::Busy`] when another walk or export is already in
    /// flight on this client. Any other failure is also broadcast as an
    /// [`Event::ExportFailed`] before it is returned.
    pub async fn run(self) -> Result<ExportArchive> {
        if self
            .client
            .in_flight_guard()
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy("an export or gallery load is already in progress".into()));
        }
        let _guard = InFlightGuard(self.client.in_flight_guard());

        self.client.emit(Event::ExportStarted);

        match self.run_inner().await {
            Ok(archive) => {
                self.client.emit(Event::ExportComplete {
                    filename: archive.filename.clone(),
                    downloaded: archive.downloaded,
                    total: archive.attempted,
                });
                Ok(archive)
            }
            Err(e) => {
                self.client.emit(Event::ExportFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_inner(&self) -> Result<ExportArchive> {
        let items = self.collect_metadata().await?;
        if items.is_empty() {
            return Err(Error::ExportFailure("no images found".into()));
        }

        let total = items.len();
        let manifest = self
            .options
            .include_metadata
            .then(|| self.render_manifest(&items))
            .transpose()?;

        let entries = self.download_images(items).await;
        let downloaded = entries.len();
        if downloaded == 0 {
            return Err(Error::ExportFailure("nothing downloaded".into()));
        }

        let bytes = build_archive(&entries, manifest.as_deref())?;
        let filename = archive_filename(self.options.team_scope, Utc::now());

        tracing::info!(
            filename = %filename,
            downloaded,
            total,
            size = bytes.len(),
            "export archive assembled"
        );

        Ok(ExportArchive {
            filename,
            bytes,
            downloaded,
            attempted: total,
        })
    }

    /// Phase 1: walk the feed at the export page size and gather every record
    async fn collect_metadata(&self) -> Result<Vec<ImageRecord>> {
        let mut session = PaginationSession::new();
        let mut items = Vec::new();

        while session.has_more {
            let page = self
                .client
                .fetch_page(
                    &self.settings,
                    session.cursor.as_deref(),
                    self.options.page_size.clamp(1, 1000),
                )
                .await?;
            session.advance(&page);
            items.extend(page.items);

            self.client.emit(Event::ExportCollecting {
                pages: session.pages,
                collected: items.len(),
                percent: (session.pages as f32 * COLLECT_STEP).min(COLLECT_CAP),
            });
        }

        Ok(items)
    }

    /// Phase 3: download every image in bounded chunks
    ///
    /// Failed downloads are logged and skipped; the returned entries keep
    /// feed order.
    async fn download_images(&self, items: Vec<ImageRecord>) -> Vec<(String, bytes::Bytes)> {
        let total = items.len();
        let mut attempted = 0usize;
        let mut downloaded = 0usize;

        let outcomes = map_chunked_with(
            items,
            self.options.concurrency,
            |item| async move {
                match self.client.fetch_bytes(&item.url).await {
                    Ok((bytes, content_type)) => {
                        let name =
                            image_filename(item.created_at, &item.title, content_type.as_deref());
                        Ok((name, bytes))
                    }
                    Err(e) => {
                        tracing::warn!(id = %item.id, error = %e, "image download failed, skipping");
                        Err(e)
                    }
                }
            },
            |chunk| {
                attempted += chunk.len();
                downloaded += chunk.iter().filter(|r| r.is_ok()).count();
                self.client.emit(Event::ExportProgress {
                    percent: COLLECT_CAP + (1.0 - COLLECT_CAP) * attempted as f32 / total as f32,
                    attempted,
                    downloaded,
                    total,
                });
            },
        )
        .await;

        outcomes.into_iter().filter_map(|r| r.ok()).collect()
    }

    fn render_manifest(&self, items: &[ImageRecord]) -> Result<Vec<u8>> {
        let manifest = Manifest {
            exported_at: Utc::now().to_rfc3339(),
            count: items.len(),
            images: items.iter().map(ManifestEntry::from).collect(),
        };
        Ok(serde_json::to_vec_pretty(&manifest)?)
    }
}

/// Phase 4: assemble the ZIP in memory
fn build_archive(entries: &[(String, bytes::Bytes)], manifest: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    if let Some(manifest) = manifest {
        writer.start_file(MANIFEST_NAME, options)?;
        writer.write_all(manifest).map_err(Error::Io)?;
    }

    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(bytes).map_err(Error::Io)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

//! # gallery-relay
//!
//! Backend library for a personal chat-image gallery: a same-origin relay in
//! front of an upstream chat-image API, plus the pagination and bulk-export
//! clients that drive it.
//!
//! ## Design Philosophy
//!
//! gallery-relay is designed to be:
//! - **Credential-shielding** - The browser only ever talks to the relay;
//!   upstream tokens and image origins stay server-side
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use gallery_relay::{Config, GalleryClient, Settings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!
//!     // Serve the relay until Ctrl+C
//!     tokio::spawn(gallery_relay::run_with_shutdown(config));
//!
//!     // Drive it from the client side
//!     let client = GalleryClient::new("http://127.0.0.1:3000");
//!     let settings = Settings {
//!         api_token: "sk-proj-abc123def456".into(),
//!         ..Default::default()
//!     };
//!
//!     // Subscribe to progress events
//!     let mut events = client.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let archive = client.export(&settings).run().await?;
//!     println!("{} ({} bytes)", archive.filename, archive.bytes.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module (the relay server)
pub mod api;
/// Pagination and export clients
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Client-local settings and their storage seam
pub mod settings;
/// Core types and events
pub mod types;
/// Upstream API client and relay-URL rewriting
pub mod upstream;

// Re-export commonly used types
pub use client::{ExportArchive, ExportJob, ExportOptions, GalleryClient, PaginationSession};
pub use config::{ClientConfig, Config, ServerConfig, UpstreamConfig};
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use settings::{MemorySettings, Settings, SettingsProvider, Theme};
pub use types::{Event, ImageRecord, Page};

use std::sync::Arc;

/// Run the relay server until a termination signal arrives.
///
/// Binds to `server.bind_address` and serves the relay router with graceful
/// shutdown.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with a Ctrl+C fallback if
///   signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use gallery_relay::{run_with_shutdown, Config};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     run_with_shutdown(config).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(config: Arc<Config>) -> Result<()> {
    config.validate()?;

    let bind_address = config.server.bind_address;
    let app = api::create_router(config);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(Error::Io)?;

    tracing::info!(address = %bind_address, "Relay server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    tracing::info!("Relay server stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    // Signal registration may fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        _ => {
            tracing::warn!("Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

//! Client-local settings and the storage seam behind them
//!
//! The original settings UI persists these values in browser storage; the
//! core never assumes a storage mechanism, it only reads a [`Settings`]
//! snapshot at the start of each operation through a [`SettingsProvider`].

use crate::config::default_true;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Client-local settings consumed by the pagination and export clients
///
/// A snapshot is taken at the start of each operation and not re-read
/// mid-operation; concurrent edits apply from the next trigger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Upstream API token, relayed via the `x-api-token` header
    #[serde(default)]
    pub api_token: String,

    /// Optional team/tenant id, relayed via the `x-team-id` header
    #[serde(default)]
    pub team_id: Option<String>,

    /// Page size for interactive browsing (clamped to 1..=1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Include a metadata manifest in exported archives
    #[serde(default = "default_true")]
    pub include_metadata: bool,

    /// Theme preference (persisted for the UI, ignored by the core)
    #[serde(default)]
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            team_id: None,
            batch_size: default_batch_size(),
            include_metadata: true,
            theme: Theme::default(),
        }
    }
}

impl Settings {
    /// Batch size clamped to the 1..=1000 window the relay accepts
    #[must_use]
    pub fn clamped_batch_size(&self) -> usize {
        self.batch_size.clamp(1, 1000)
    }

    /// Whether the settings carry a team scope
    #[must_use]
    pub fn is_team_scoped(&self) -> bool {
        self.team_id.as_deref().is_some_and(|t| !t.is_empty())
    }
}

fn default_batch_size() -> usize {
    50
}

/// Theme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    Light,
    /// Dark theme
    Dark,
    /// Follow the system preference
    #[default]
    System,
}

/// Storage seam for client-local settings
///
/// Implementations may back this with browser storage, a config file, or
/// nothing at all; the core only calls `get` and `set`.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Read the current settings snapshot
    async fn get(&self) -> Settings;

    /// Replace the stored settings
    async fn set(&self, settings: Settings);
}

/// In-memory settings provider
///
/// The default provider for library use and tests; nothing is persisted.
#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: RwLock<Settings>,
}

impl MemorySettings {
    /// Create a provider holding the given settings
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsProvider for MemorySettings {
    async fn get(&self) -> Settings {
        self.inner.read().await.clone()
    }

    async fn set(&self, settings: Settings) {
        *self.inner.write().await = settings;
    }
}

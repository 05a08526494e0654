/// Config schema: poll pacing, catalog access, Discord delivery and storage.
use std::{path::PathBuf, time::Duration};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookoutConfig {
    pub monitor: MonitorConfig,
    pub catalog: CatalogConfig,
    pub discord: DiscordConfig,
    pub storage: StorageConfig,
}

/// Per-channel poll loop pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_min_ms: u64,
    pub poll_max_ms: u64,
    /// Listings examined per round; 0 means the whole page.
    pub max_items_per_tick: usize,
    /// Seconds between dedup reclamation cycles.
    pub reclaim_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_min_ms: 3_000,
            poll_max_ms: 7_000,
            max_items_per_tick: 3,
            reclaim_interval_secs: 3_600,
        }
    }
}

impl MonitorConfig {
    pub fn poll_min(&self) -> Duration {
        Duration::from_millis(self.poll_min_ms)
    }

    pub fn poll_max(&self) -> Duration {
        Duration::from_millis(self.poll_max_ms)
    }

    pub fn per_tick_limit(&self) -> Option<usize> {
        (self.max_items_per_tick > 0).then_some(self.max_items_per_tick)
    }

    pub fn reclaim_interval(&self) -> Duration {
        Duration::from_secs(self.reclaim_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Listings requested per search.
    pub page_size: u32,
    pub request_timeout_secs: u64,
    /// Visit the catalog page before each search to pick up session cookies.
    pub warm_up: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.vinted.fr".into(),
            page_size: 5,
            request_timeout_secs: 10,
            warm_up: false,
        }
    }
}

impl CatalogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<Secret<String>>,
    /// REST proxy base URL; requests go straight to Discord when unset.
    pub proxy: Option<String>,
    pub send_timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            proxy: None,
            send_timeout_secs: 10,
        }
    }
}

impl DiscordConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Channel configuration file. Defaults to `<data_dir>/channels.json`.
    pub channels_path: Option<PathBuf>,
}

impl LookoutConfig {
    /// Resolved channel configuration file.
    pub fn channels_path(&self) -> PathBuf {
        self.storage
            .channels_path
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("channels.json"))
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

//! Persistence trait for channel configuration.

use {async_trait::async_trait, lookout_catalog::FilterSpec};

use crate::{Result, types::StoredChannel};

/// Durable map of channel id to [`FilterSpec`].
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Every decodable entry. Entries that fail to decode are skipped, not fatal.
    async fn load(&self) -> Result<Vec<StoredChannel>>;
    /// Insert or replace one channel's configuration, leaving the others intact.
    async fn upsert(&self, channel_id: &str, filter: &FilterSpec) -> Result<()>;
    /// Returns `false` (and writes nothing) when the channel was absent.
    async fn remove(&self, channel_id: &str) -> Result<bool>;
}

//! In-memory channel store.

use std::{collections::BTreeMap, sync::Mutex};

use {async_trait::async_trait, lookout_catalog::FilterSpec};

use crate::{Result, store::ChannelStore, types::StoredChannel};

/// Volatile store, mostly for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    channels: Mutex<BTreeMap<String, FilterSpec>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, as if `channels` had been persisted by an earlier run.
    pub fn with_channels(channels: impl IntoIterator<Item = (String, FilterSpec)>) -> Self {
        Self {
            channels: Mutex::new(channels.into_iter().collect()),
        }
    }

    pub fn get(&self, channel_id: &str) -> Option<FilterSpec> {
        self.lock().get(channel_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, FilterSpec>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ChannelStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<StoredChannel>> {
        Ok(self
            .lock()
            .iter()
            .map(|(channel_id, filter)| StoredChannel {
                channel_id: channel_id.clone(),
                filter: filter.clone(),
            })
            .collect())
    }

    async fn upsert(&self, channel_id: &str, filter: &FilterSpec) -> Result<()> {
        self.lock().insert(channel_id.to_string(), filter.clone());
        Ok(())
    }

    async fn remove(&self, channel_id: &str) -> Result<bool> {
        Ok(self.lock().remove(channel_id).is_some())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_and_remove_reports_presence() {
        let store = InMemoryStore::new();
        store.upsert("1", &FilterSpec::default()).await.unwrap();
        let coats = FilterSpec {
            search_text: "coat".into(),
            ..FilterSpec::default()
        };
        store.upsert("1", &coats).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1"), Some(coats));
        assert!(store.remove("1").await.unwrap());
        assert!(!store.remove("1").await.unwrap());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeded_channels_load_in_id_order() {
        let store = InMemoryStore::with_channels([
            ("b".to_string(), FilterSpec::default()),
            ("a".to_string(), FilterSpec::default()),
        ]);
        let ids: Vec<String> = store
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.channel_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}

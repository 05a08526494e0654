//! JSON file-backed channel store with atomic writes.
//!
//! The file is a single object keyed by channel id. Entries this build cannot
//! decode are skipped on load but written back untouched, so a newer or
//! hand-edited entry survives unrelated updates.

use std::path::{Path, PathBuf};

use {
    async_trait::async_trait,
    lookout_catalog::FilterSpec,
    serde_json::{Map, Value},
    tokio::{fs, sync::Mutex},
    tracing::warn,
};

use crate::{Error, Result, store::ChannelStore, types::StoredChannel};

pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_raw(&self) -> Result<Map<String, Value>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path).await?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::message(format!(
                "{} must contain a JSON object keyed by channel id",
                self.path.display()
            ))),
        }
    }

    /// Atomic write: write to temp, rename over target, keep `.bak`.
    async fn write_raw(&self, channels: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(channels)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;

        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let bak = self.path.with_extension("json.bak");
            if let Err(e) = fs::copy(&self.path, &bak).await {
                warn!(path = %bak.display(), error = %e, "failed to keep channel store backup");
            }
        }

        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ChannelStore for FileStore {
    async fn load(&self) -> Result<Vec<StoredChannel>> {
        let raw = self.read_raw().await?;
        let mut channels = Vec::with_capacity(raw.len());
        for (channel_id, value) in raw {
            if !value.is_object() {
                warn!(%channel_id, "skipping channel entry that is not an object");
                continue;
            }
            match serde_json::from_value::<FilterSpec>(value) {
                Ok(filter) => channels.push(StoredChannel { channel_id, filter }),
                Err(e) => warn!(%channel_id, error = %e, "skipping undecodable channel entry"),
            }
        }
        Ok(channels)
    }

    async fn upsert(&self, channel_id: &str, filter: &FilterSpec) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.read_raw().await?;
        raw.insert(channel_id.to_string(), serde_json::to_value(filter)?);
        self.write_raw(&raw).await
    }

    async fn remove(&self, channel_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.read_raw().await?;
        if raw.remove(channel_id).is_none() {
            return Ok(false);
        }
        self.write_raw(&raw).await?;
        Ok(true)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("channels.json"))
    }

    fn shoes() -> FilterSpec {
        FilterSpec {
            search_text: "shoes".into(),
            brand_ids: vec![5],
            ..FilterSpec::default()
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(store_in(&tmp).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.upsert("42", &shoes()).await.unwrap();
        store
            .upsert("43", &FilterSpec::default().with_readonly(true))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], StoredChannel {
            channel_id: "42".into(),
            filter: shoes(),
        });
        assert!(loaded[1].filter.readonly);
    }

    #[tokio::test]
    async fn backup_kept_on_rewrite() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.upsert("1", &shoes()).await.unwrap();
        let first = std::fs::read(store.path()).unwrap();
        store.upsert("2", &shoes()).await.unwrap();

        let bak = tmp.path().join("channels.json.bak");
        assert_eq!(std::fs::read(&bak).unwrap(), first);
        assert!(!tmp.path().join("channels.json.tmp").exists());
        assert_eq!(store.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_backup_does_not_block_write() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.upsert("1", &shoes()).await.unwrap();
        std::fs::create_dir(tmp.path().join("channels.json.bak")).unwrap();

        store.upsert("2", &shoes()).await.unwrap();

        assert!(tmp.path().join("channels.json.bak").is_dir());
        assert_eq!(store.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn remove_absent_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.upsert("1", &shoes()).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        assert!(!store.remove("nope").await.unwrap());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);

        assert!(store.remove("1").await.unwrap());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_entries_skipped_but_preserved() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        std::fs::write(
            store.path(),
            r#"{
                "1": {"search_text": "coat", "price_max": 80},
                "2": "garbage",
                "3": {"price_min": "cheap"}
            }"#,
        )
        .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].filter.search_text, "coat");
        assert_eq!(loaded[0].filter.price_max, 80);

        store.upsert("4", &shoes()).await.unwrap();
        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["2"], "garbage");
        assert_eq!(raw["3"]["price_min"], "cheap");
        assert_eq!(raw["4"]["search_text"], "shoes");
    }

    #[tokio::test]
    async fn non_object_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        std::fs::write(store.path(), "[1, 2]").unwrap();
        assert!(store.load().await.is_err());
        assert!(store.upsert("1", &shoes()).await.is_err());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[1, 2]");
    }

    #[tokio::test]
    async fn non_ascii_text_written_verbatim() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let filter = FilterSpec {
            search_text: "robe été".into(),
            ..FilterSpec::default()
        };
        store.upsert("1", &filter).await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("robe été"));
        assert!(text.contains('\n'));
    }
}

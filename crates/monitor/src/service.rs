//! Engine supervisor: owns every channel's monitor, dedup store and
//! persisted configuration.

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use {
    lookout_catalog::{CatalogClient, FilterSpec, parse_filter_url},
    lookout_notify::Notifier,
    tokio::{sync::Mutex, time::Instant},
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use lookout_metrics::{counter, gauge, service as service_metrics};

use crate::{
    Error, Result,
    dedup::DedupStore,
    monitor::{ChannelMonitor, MonitorSettings},
    store::ChannelStore,
    task::TaskHandle,
    types::{ChannelSummary, MonitorState, StopOutcome, StoredChannel, WatchStatus},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub monitor: MonitorSettings,
    /// Period of the dedup reclamation cycle. The first cycle runs one full
    /// period after [`WatchService::start_reclaim`].
    pub reclaim_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorSettings::default(),
            reclaim_interval: Duration::from_secs(3600),
        }
    }
}

struct ChannelState {
    filter: FilterSpec,
    dedup: Arc<DedupStore>,
    monitor: Option<TaskHandle>,
}

impl ChannelState {
    fn state(&self) -> MonitorState {
        match &self.monitor {
            Some(handle) if handle.is_running() => MonitorState::Running,
            _ => MonitorState::Stopped,
        }
    }
}

/// Channel lifecycle manager.
///
/// Lifecycle operations hold one lock over the whole channel map, including
/// while a replaced monitor is awaited, so start/stop for any channel are
/// serialized and a channel never has two live monitors.
pub struct WatchService {
    store: Arc<dyn ChannelStore>,
    catalog: Arc<dyn CatalogClient>,
    notifier: Arc<dyn Notifier>,
    config: WatchConfig,
    channels: Mutex<HashMap<String, ChannelState>>,
    reclaimer: Mutex<Option<TaskHandle>>,
}

impl WatchService {
    pub fn new(
        store: Arc<dyn ChannelStore>,
        catalog: Arc<dyn CatalogClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Self::with_config(store, catalog, notifier, WatchConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ChannelStore>,
        catalog: Arc<dyn CatalogClient>,
        notifier: Arc<dyn Notifier>,
        config: WatchConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            catalog,
            notifier,
            config,
            channels: Mutex::new(HashMap::new()),
            reclaimer: Mutex::new(None),
        })
    }

    /// Parse `raw_url` and (re)start the channel with the result.
    ///
    /// A readonly channel is refused before the URL is even parsed.
    pub async fn configure(
        &self,
        channel_id: &str,
        raw_url: &str,
        readonly: bool,
    ) -> Result<FilterSpec> {
        if self
            .get_config(channel_id)
            .await
            .is_some_and(|filter| filter.readonly)
        {
            info!(%channel_id, "refusing to reconfigure readonly channel");
            return Err(Error::readonly(channel_id));
        }
        let filter = parse_filter_url(raw_url)?.with_readonly(readonly);
        self.start(channel_id, filter.clone()).await?;
        Ok(filter)
    }

    /// Persist `filter` and run a fresh monitor for the channel.
    ///
    /// Persistence happens first; if it fails nothing else changes. A
    /// monitor already running for the channel is stopped and awaited before
    /// its replacement is spawned, and the replacement starts with an empty
    /// dedup store.
    pub async fn start(&self, channel_id: &str, filter: FilterSpec) -> Result<()> {
        let mut channels = self.channels.lock().await;
        if channels.get(channel_id).is_some_and(|s| s.filter.readonly) {
            return Err(Error::readonly(channel_id));
        }

        self.store
            .upsert(channel_id, &filter)
            .await
            .map_err(|e| Error::persistence(channel_id, e))?;

        if let Some(previous) = channels.remove(channel_id)
            && let Some(handle) = previous.monitor
        {
            debug!(%channel_id, "stopping previous monitor");
            handle.stop().await;
        }

        let state = self.spawn_channel(channel_id, filter);
        channels.insert(channel_id.to_string(), state);
        info!(%channel_id, "channel monitor configured");
        self.record_running(&channels);
        Ok(())
    }

    /// Remove the channel's configuration and stop its monitor.
    ///
    /// When the channel has no state this is a no-op reported as
    /// [`StopOutcome::NothingToStop`]; the store is not touched.
    pub async fn stop(&self, channel_id: &str) -> Result<StopOutcome> {
        let mut channels = self.channels.lock().await;
        if !channels.contains_key(channel_id) {
            info!(%channel_id, "no monitor to stop");
            return Ok(StopOutcome::NothingToStop);
        }

        self.store
            .remove(channel_id)
            .await
            .map_err(|e| Error::persistence(channel_id, e))?;

        if let Some(state) = channels.remove(channel_id)
            && let Some(handle) = state.monitor
        {
            handle.stop().await;
        }
        info!(%channel_id, "channel monitor stopped and configuration removed");
        self.record_running(&channels);
        Ok(StopOutcome::Stopped)
    }

    pub async fn get_config(&self, channel_id: &str) -> Option<FilterSpec> {
        self.channels
            .lock()
            .await
            .get(channel_id)
            .map(|s| s.filter.clone())
    }

    /// Every configured channel, ordered by id.
    pub async fn list(&self) -> Vec<ChannelSummary> {
        let channels = self.channels.lock().await;
        let mut summaries: Vec<ChannelSummary> = channels
            .iter()
            .map(|(channel_id, s)| ChannelSummary {
                channel_id: channel_id.clone(),
                filter: s.filter.clone(),
                state: s.state(),
                seen_items: s.dedup.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.channel_id.cmp(&b.channel_id));
        summaries
    }

    pub async fn status(&self) -> WatchStatus {
        let reclaiming = self
            .reclaimer
            .lock()
            .await
            .as_ref()
            .is_some_and(TaskHandle::is_running);
        let channels = self.channels.lock().await;
        WatchStatus {
            channels: channels.len(),
            running: channels
                .values()
                .filter(|s| s.state() == MonitorState::Running)
                .count(),
            seen_items: channels.values().map(|s| s.dedup.len()).sum(),
            reclaiming,
        }
    }

    /// Start a monitor for every persisted channel. Returns how many were
    /// started.
    ///
    /// An unreadable store is logged and treated as empty.
    pub async fn restore_all(&self) -> usize {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to load channel configuration; starting with none");
                return 0;
            },
        };

        let mut channels = self.channels.lock().await;
        let mut restored = 0;
        for StoredChannel { channel_id, filter } in stored {
            if let Some(previous) = channels.remove(&channel_id)
                && let Some(handle) = previous.monitor
            {
                handle.stop().await;
            }
            let state = self.spawn_channel(&channel_id, filter);
            channels.insert(channel_id, state);
            restored += 1;
        }
        info!(count = restored, "restored channel monitors");
        self.record_running(&channels);
        restored
    }

    /// Clear every channel's dedup store. Returns the number of identifiers
    /// dropped.
    ///
    /// The channel lock is released before clearing, so a cycle never blocks
    /// configuration and never stops a monitor.
    pub async fn reclaim_now(&self) -> usize {
        let stores: Vec<(String, Arc<DedupStore>)> = self
            .channels
            .lock()
            .await
            .iter()
            .map(|(id, s)| (id.clone(), Arc::clone(&s.dedup)))
            .collect();

        let mut total = 0;
        for (channel_id, dedup) in &stores {
            let cleared = dedup.clear();
            debug!(%channel_id, cleared, "dedup store cleared");
            total += cleared;
        }
        info!(channels = stores.len(), cleared = total, "dedup reclamation finished");

        #[cfg(feature = "metrics")]
        {
            counter!(service_metrics::RECLAIM_CYCLES_TOTAL).increment(1);
            counter!(service_metrics::RECLAIMED_ENTRIES_TOTAL).increment(total as u64);
        }
        total
    }

    /// Start the periodic reclamation task. Calling it again while the task
    /// runs does nothing.
    pub async fn start_reclaim(self: &Arc<Self>) {
        let mut reclaimer = self.reclaimer.lock().await;
        if reclaimer.as_ref().is_some_and(TaskHandle::is_running) {
            return;
        }

        let period = self.config.reclaim_interval;
        let service: Weak<Self> = Arc::downgrade(self);
        *reclaimer = Some(TaskHandle::spawn(move |cancel| async move {
            info!(period_secs = period.as_secs(), "dedup reclamation scheduled");
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(svc) = service.upgrade() else { break };
                        svc.reclaim_now().await;
                    },
                }
            }
            debug!("dedup reclamation task exited");
        }));
    }

    /// Stop reclamation and every monitor. Configuration, in memory and
    /// persisted, is kept.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.reclaimer.lock().await.take() {
            handle.stop().await;
        }

        let mut channels = self.channels.lock().await;
        for (channel_id, state) in channels.iter_mut() {
            if let Some(handle) = state.monitor.take() {
                handle.stop().await;
                debug!(%channel_id, "monitor stopped for shutdown");
            }
        }
        info!(channels = channels.len(), "watch service shut down");
        self.record_running(&channels);
    }

    fn spawn_channel(&self, channel_id: &str, filter: FilterSpec) -> ChannelState {
        let dedup = Arc::new(DedupStore::new());
        let monitor = ChannelMonitor::new(
            channel_id,
            filter.clone(),
            Arc::clone(&dedup),
            Arc::clone(&self.catalog),
            Arc::clone(&self.notifier),
            self.config.monitor.clone(),
        );
        ChannelState {
            filter,
            dedup,
            monitor: Some(monitor.spawn()),
        }
    }

    #[cfg(feature = "metrics")]
    fn record_running(&self, channels: &HashMap<String, ChannelState>) {
        let running = channels.values().filter(|s| s.monitor.is_some()).count();
        gauge!(service_metrics::CHANNELS_RUNNING).set(running as f64);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_running(&self, _channels: &HashMap<String, ChannelState>) {}
}

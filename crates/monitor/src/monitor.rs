//! The per-channel poll loop.

use std::{sync::Arc, time::Duration};

use {
    lookout_catalog::{CatalogClient, FilterSpec},
    lookout_notify::Notifier,
    rand::Rng,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use lookout_metrics::{counter, histogram, monitor as monitor_metrics};

use crate::{dedup::DedupStore, task::TaskHandle};

/// Pacing knobs shared by every monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Shortest pause between two rounds.
    pub poll_min: Duration,
    /// Longest pause between two rounds.
    pub poll_max: Duration,
    /// Listings examined per round. `None` examines the whole page.
    pub max_items_per_tick: Option<usize>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_min: Duration::from_millis(3_000),
            poll_max: Duration::from_millis(7_000),
            max_items_per_tick: Some(3),
        }
    }
}

impl MonitorSettings {
    /// Uniformly random pause in `[poll_min, poll_max]`.
    pub fn next_pause(&self) -> Duration {
        let lo = millis(self.poll_min.min(self.poll_max));
        let hi = millis(self.poll_min.max(self.poll_max));
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Counts for one poll round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fetched: usize,
    pub examined: usize,
    pub notified: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub fetch_failed: bool,
}

/// Polls the catalog for one channel and notifies each new listing once.
pub struct ChannelMonitor {
    channel_id: String,
    filter: FilterSpec,
    dedup: Arc<DedupStore>,
    catalog: Arc<dyn CatalogClient>,
    notifier: Arc<dyn Notifier>,
    settings: MonitorSettings,
}

impl ChannelMonitor {
    pub fn new(
        channel_id: impl Into<String>,
        filter: FilterSpec,
        dedup: Arc<DedupStore>,
        catalog: Arc<dyn CatalogClient>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            filter,
            dedup,
            catalog,
            notifier,
            settings,
        }
    }

    /// Run one round: fetch, then notify every unseen listing among the
    /// first `max_items_per_tick`.
    ///
    /// Fetch and notification failures are logged and counted, never
    /// returned. A listing is marked seen before its notification is sent and
    /// stays seen if the send fails.
    pub async fn tick(&self) -> TickReport {
        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();

        let mut report = TickReport::default();
        let items = match self.catalog.fetch(&self.filter).await {
            Ok(items) => items,
            Err(e) => {
                warn!(channel_id = %self.channel_id, error = %e, "catalog fetch failed");
                report.fetch_failed = true;
                #[cfg(feature = "metrics")]
                counter!(monitor_metrics::FETCH_ERRORS_TOTAL).increment(1);
                Vec::new()
            },
        };
        report.fetched = items.len();

        let limit = self.settings.max_items_per_tick.unwrap_or(usize::MAX);
        for item in items.iter().take(limit) {
            report.examined += 1;
            if !self.dedup.check_and_insert(item.id()) {
                report.duplicates += 1;
                continue;
            }
            match self.notifier.notify(&self.channel_id, item).await {
                Ok(()) => {
                    report.notified += 1;
                    debug!(channel_id = %self.channel_id, url = %item.url, "listing notified");
                },
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        channel_id = %self.channel_id,
                        url = %item.url,
                        error = %e,
                        "notification failed"
                    );
                },
            }
        }

        #[cfg(feature = "metrics")]
        {
            counter!(monitor_metrics::TICKS_TOTAL).increment(1);
            counter!(monitor_metrics::ITEMS_FETCHED_TOTAL).increment(report.fetched as u64);
            counter!(monitor_metrics::DUPLICATES_TOTAL).increment(report.duplicates as u64);
            counter!(monitor_metrics::NOTIFICATIONS_TOTAL).increment(report.notified as u64);
            counter!(monitor_metrics::NOTIFICATION_ERRORS_TOTAL).increment(report.failed as u64);
            histogram!(monitor_metrics::TICK_DURATION_SECONDS)
                .record(started.elapsed().as_secs_f64());
        }

        report
    }

    /// Start the loop on the current runtime.
    pub fn spawn(self) -> TaskHandle {
        TaskHandle::spawn(move |cancel| self.run(cancel))
    }

    async fn run(self, cancel: CancellationToken) {
        info!(channel_id = %self.channel_id, "channel monitor started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                report = self.tick() => {
                    debug!(
                        channel_id = %self.channel_id,
                        fetched = report.fetched,
                        notified = report.notified,
                        duplicates = report.duplicates,
                        "poll round finished"
                    );
                },
            }

            let pause = self.settings.next_pause();
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(pause) => {},
            }
        }
        info!(channel_id = %self.channel_id, "channel monitor stopped");
    }
}

//! Metric name constants, grouped by subsystem.

/// Channel monitor loop metrics
pub mod monitor {
    /// Poll rounds completed
    pub const TICKS_TOTAL: &str = "lookout_monitor_ticks_total";
    /// Catalog fetches that returned an error
    pub const FETCH_ERRORS_TOTAL: &str = "lookout_monitor_fetch_errors_total";
    /// Listings fetched across all rounds
    pub const ITEMS_FETCHED_TOTAL: &str = "lookout_monitor_items_fetched_total";
    /// Listings skipped because the channel already saw them
    pub const DUPLICATES_TOTAL: &str = "lookout_monitor_duplicates_total";
    /// Notifications delivered
    pub const NOTIFICATIONS_TOTAL: &str = "lookout_monitor_notifications_total";
    /// Notifications the sink rejected
    pub const NOTIFICATION_ERRORS_TOTAL: &str = "lookout_monitor_notification_errors_total";
    /// Poll round duration in seconds
    pub const TICK_DURATION_SECONDS: &str = "lookout_monitor_tick_duration_seconds";
}

/// Engine supervisor metrics
pub mod service {
    /// Channels with a running monitor
    pub const CHANNELS_RUNNING: &str = "lookout_channels_running";
    /// Reclamation cycles executed
    pub const RECLAIM_CYCLES_TOTAL: &str = "lookout_reclaim_cycles_total";
    /// Dedup entries dropped by reclamation
    pub const RECLAIMED_ENTRIES_TOTAL: &str = "lookout_reclaimed_entries_total";
}

/// Histogram buckets by metric family
pub mod buckets {
    use once_cell::sync::Lazy;

    /// Poll round duration buckets (in seconds)
    /// Covers 10ms to 60s; a round is one catalog fetch plus its deliveries
    pub static TICK_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]
    });
}

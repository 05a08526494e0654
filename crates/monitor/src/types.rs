use serde::Serialize;

use lookout_catalog::FilterSpec;

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// The channel had state; its monitor has exited and its configuration is gone.
    Stopped,
    /// The channel was never configured. Nothing was changed.
    NothingToStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Running,
    Stopped,
}

/// One configured channel as reported by [`WatchService::list`](crate::service::WatchService::list).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub channel_id: String,
    pub filter: FilterSpec,
    pub state: MonitorState,
    pub seen_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStatus {
    pub channels: usize,
    pub running: usize,
    pub seen_items: usize,
    pub reclaiming: bool,
}

/// A persisted channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChannel {
    pub channel_id: String,
    pub filter: FilterSpec,
}

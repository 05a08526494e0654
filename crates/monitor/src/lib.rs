//! Channel monitoring engine.
//!
//! One poll loop per configured channel fetches the newest catalog listings
//! for that channel's filter and notifies each listing once. The
//! [`WatchService`](service::WatchService) owns every loop, persists channel
//! configuration through a [`ChannelStore`](store::ChannelStore) and
//! periodically clears the per-channel dedup state.

pub mod dedup;
pub mod error;
pub mod monitor;
pub mod service;
pub mod store;
pub mod store_file;
pub mod store_memory;
pub mod task;
pub mod types;

pub use error::{Error, Result};

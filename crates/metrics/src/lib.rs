//! Metric names recorded by lookout, and the recorder that exports them.
//!
//! Recording goes through the `metrics` facade, so nothing is collected until
//! the binary calls [`init_metrics`]. With the `prometheus` feature that
//! installs a Prometheus recorder whose text output is available from
//! [`MetricsHandle::render`].
//!
//! ```rust,ignore
//! use lookout_metrics::{counter, monitor};
//!
//! counter!(monitor::TICKS_TOTAL).increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

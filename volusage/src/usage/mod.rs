//! Volume usage tracking.
//!
//! - `key`: usage keys built from logical volume identity and usage mode
//! - `tracker`: the claim/free registry
//! - `metrics`: lock-free counters for claims, frees and misuse
//! - `options`: tracker configuration

mod key;
mod metrics;
mod options;
mod tracker;

pub use key::{AccessMode, AttachmentMode, UsageKey, UsageOptions, VolumeRef};
pub use metrics::{UsageMetrics, UsageMetricsStorage};
pub use options::{MisuseLogLevel, TrackerOptions};
pub use tracker::{VolumeUsage, VolumeUsageTracker};

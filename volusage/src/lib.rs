//! Node-local volume usage tracking.
//!
//! A volume manager calls [`VolumeUsageTracker::claim`] before it stages and
//! publishes a volume for an allocation, and [`VolumeUsageTracker::free`]
//! once the allocation is done with it. `free` returns `true` when the
//! volume has no consumers left and may be unpublished.
//!
//! ```
//! use volusage::{Allocation, CsiVolume, VolumeUsageTracker};
//!
//! let tracker: VolumeUsageTracker = VolumeUsageTracker::new();
//! let vol = CsiVolume::new("default", "vol-1");
//! let (a1, a2) = (Allocation::new("a1"), Allocation::new("a2"));
//!
//! tracker.claim(&a1, &vol);
//! tracker.claim(&a2, &vol);
//! assert!(!tracker.free(&a1, &vol));
//! assert!(tracker.free(&a2, &vol));
//! ```

pub mod structs;
pub mod usage;

pub use structs::{
    AllocClientStatus, AllocID, Allocation, Claimant, CsiVolume, Job, VolumeIdentity,
};
pub use usage::{
    AccessMode, AttachmentMode, MisuseLogLevel, TrackerOptions, UsageKey, UsageMetrics,
    UsageOptions, VolumeRef, VolumeUsage, VolumeUsageTracker,
};
pub use volusage_shared::errors::{VolusageError, VolusageResult};

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static LOGGING_INIT: Once = Once::new();

/// Install a `tracing` fmt subscriber for the process.
///
/// `filter` takes `EnvFilter` directives (e.g. `volusage=debug`). Without
/// one, `RUST_LOG` is used, falling back to `info`. Only the first call
/// installs anything; later and concurrent calls return `Ok`. If the host
/// already set a global subscriber, that subscriber is kept.
pub fn init_logging(filter: Option<&str>) -> VolusageResult<()> {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).map_err(|e| {
            VolusageError::Config(format!("invalid log filter '{}': {}", directives, e))
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    LOGGING_INIT.call_once(|| {
        match tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
        {
            Ok(()) => tracing::debug!("initialized logging"),
            Err(e) => tracing::debug!(error = %e, "Keeping existing log subscriber"),
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        let result = init_logging(Some("volusage=notalevel"));
        assert!(matches!(result, Err(VolusageError::Config(_))));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Some("volusage=debug")).unwrap();
        init_logging(Some("volusage=trace")).unwrap();
        init_logging(None).unwrap();

        let tracker: VolumeUsageTracker = VolumeUsageTracker::new();
        let vol = CsiVolume::new("default", "vol-1");
        let alloc = Allocation::new("a1");
        tracker.claim(&alloc, &vol);
        assert!(tracker.free(&alloc, &vol));
    }

    #[test]
    fn test_concurrent_init_logging_all_succeed() {
        const THREADS: usize = 8;

        let barrier = std::sync::Barrier::new(THREADS);
        let results: Vec<VolusageResult<()>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        init_logging(Some("info"))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let errors: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
        assert!(errors.is_empty(), "init_logging failed: {:?}", errors);
    }
}

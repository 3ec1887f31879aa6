//! Thread-safe volume usage tracker.
//!
//! Records which allocations currently claim each volume so the volume
//! manager knows when the last consumer is gone and the volume can be
//! unpublished and unstaged.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::key::{UsageKey, UsageOptions, VolumeRef};
use super::metrics::{UsageMetrics, UsageMetricsStorage};
use super::options::{MisuseLogLevel, TrackerOptions};
use crate::structs::{AllocID, Allocation, Claimant, VolumeIdentity};

/// One usage set as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeUsage {
    pub key: UsageKey,
    pub alloc_ids: Vec<AllocID>,
}

/// Tracks the allocations that depend on each volume.
///
/// # Design
///
/// - **Shared ownership**: Cloneable via `Arc`; every clone sees the same claims
/// - **Single lock**: One mutex guards the whole map for every claim and free.
///   Keys serialize against each other, which keeps the tracker free of
///   lock-ordering concerns
/// - **Infallible**: `parking_lot::Mutex` does not poison, so neither `claim`
///   nor `free` returns a `Result`
/// - **Detached copies**: Stored entries come from [`Claimant::detached_copy`]
///
/// # Caller contract
///
/// Claims are not deduplicated. Claiming the same allocation twice for one
/// key stores two entries, and a single `free` removes both. Call `claim` and
/// `free` at most once per claim lifecycle.
///
/// `free` on a pair that was never claimed reports the volume as idle. There
/// is no error for it: after a restart the tracker is empty until
/// [`VolumeUsageTracker::restore`] runs, and a release in that window must
/// still let the volume go.
#[derive(Clone)]
pub struct VolumeUsageTracker<A: Claimant = Allocation> {
    inner: Arc<TrackerInner<A>>,
}

struct TrackerInner<A> {
    state: Mutex<HashMap<UsageKey, Vec<A>>>,
    options: TrackerOptions,
    metrics: UsageMetricsStorage,
}

impl<A: Claimant> std::fmt::Debug for VolumeUsageTracker<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeUsageTracker")
            .field("options", &self.inner.options)
            .finish()
    }
}

impl<A: Claimant> Default for VolumeUsageTracker<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Claimant> VolumeUsageTracker<A> {
    pub fn new() -> Self {
        Self::with_options(TrackerOptions::default())
    }

    pub fn with_options(options: TrackerOptions) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                state: Mutex::new(HashMap::new()),
                options,
                metrics: UsageMetricsStorage::new(),
            }),
        }
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.inner.options
    }

    /// Record that `alloc` uses `volume`.
    pub fn claim<V: VolumeIdentity + ?Sized>(&self, alloc: &A, volume: &V) {
        self.claim_key(alloc, UsageKey::new(volume.volume_ref()));
    }

    /// Record that `alloc` uses `volume` in the given usage mode.
    ///
    /// Each usage mode of a volume has its own usage set.
    pub fn claim_with_usage<V: VolumeIdentity + ?Sized>(
        &self,
        alloc: &A,
        volume: &V,
        usage: UsageOptions,
    ) {
        self.claim_key(alloc, UsageKey::with_usage(volume.volume_ref(), usage));
    }

    /// Drop every claim `alloc` holds on `volume`.
    ///
    /// Returns `true` when no allocation is left claiming the volume, which
    /// includes the case where nothing was claimed to begin with.
    pub fn free<V: VolumeIdentity + ?Sized>(&self, alloc: &A, volume: &V) -> bool {
        self.free_key(alloc, UsageKey::new(volume.volume_ref()))
    }

    /// Like [`free`](Self::free), for a claim made with a usage mode.
    pub fn free_with_usage<V: VolumeIdentity + ?Sized>(
        &self,
        alloc: &A,
        volume: &V,
        usage: UsageOptions,
    ) -> bool {
        self.free_key(alloc, UsageKey::with_usage(volume.volume_ref(), usage))
    }

    fn claim_key(&self, alloc: &A, key: UsageKey) {
        let copy = alloc.detached_copy();

        let mut state = self.inner.state.lock();
        let allocs = state.entry(key.clone()).or_default();

        let duplicate = allocs.iter().any(|a| a.claim_id() == alloc.claim_id());
        allocs.push(copy);
        let usage_count = allocs.len();
        drop(state);

        self.inner.metrics.record_claim(duplicate);
        tracing::debug!(
            alloc_id = %alloc.claim_id(),
            volume = %key,
            usage_count,
            "Claimed volume"
        );
        if duplicate {
            self.log_misuse(
                alloc.claim_id(),
                &key,
                "Allocation claimed volume more than once",
            );
        }
    }

    fn free_key(&self, alloc: &A, key: UsageKey) -> bool {
        let mut state = self.inner.state.lock();

        let (removed, remaining) = match state.get_mut(&key) {
            Some(allocs) => {
                let before = allocs.len();
                allocs.retain(|a| a.claim_id() != alloc.claim_id());
                (before - allocs.len(), allocs.len())
            }
            None => (0, 0),
        };

        if remaining == 0 && state.remove(&key).is_some() {
            tracing::trace!(volume = %key, "Removed empty usage set");
        }
        drop(state);

        let idle = remaining == 0;
        self.inner.metrics.record_free(removed > 0, idle);
        tracing::debug!(
            alloc_id = %alloc.claim_id(),
            volume = %key,
            removed,
            usage_count = remaining,
            idle,
            "Freed volume"
        );
        if removed == 0 {
            self.log_misuse(
                alloc.claim_id(),
                &key,
                "Freed volume that allocation never claimed",
            );
        }

        idle
    }

    fn log_misuse(&self, alloc_id: &AllocID, key: &UsageKey, message: &str) {
        match self.inner.options.misuse_log_level {
            MisuseLogLevel::Off => {}
            MisuseLogLevel::Debug => {
                tracing::debug!(alloc_id = %alloc_id, volume = %key, "{}", message)
            }
            MisuseLogLevel::Warn => {
                tracing::warn!(alloc_id = %alloc_id, volume = %key, "{}", message)
            }
        }
    }

    /// Copies of the allocations claiming `volume` in the implicit usage mode.
    pub fn allocs_for<V: VolumeIdentity + ?Sized>(&self, volume: &V) -> Vec<A> {
        self.allocs_for_key(&UsageKey::new(volume.volume_ref()))
    }

    pub fn allocs_for_key(&self, key: &UsageKey) -> Vec<A> {
        self.inner
            .state
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether any usage mode of `volume` still has a claim.
    pub fn is_in_use<V: VolumeIdentity + ?Sized>(&self, volume: &V) -> bool {
        let volume: VolumeRef = volume.volume_ref();
        // Usage sets are never stored empty, so key presence is enough.
        self.inner
            .state
            .lock()
            .keys()
            .any(|key| key.volume == volume)
    }

    /// Number of usage keys with at least one claim.
    pub fn key_count(&self) -> usize {
        self.inner.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().is_empty()
    }

    /// All usage sets, sorted by key.
    pub fn snapshot(&self) -> Vec<VolumeUsage> {
        let state = self.inner.state.lock();
        let mut usages: Vec<VolumeUsage> = state
            .iter()
            .map(|(key, allocs)| VolumeUsage {
                key: key.clone(),
                alloc_ids: allocs.iter().map(|a| a.claim_id().clone()).collect(),
            })
            .collect();
        drop(state);

        usages.sort_by(|a, b| a.key.cmp(&b.key));
        usages
    }

    /// Rebuild claims from the running allocations after a restart.
    ///
    /// Each pair is claimed in order, exactly as if `claim` had been called
    /// for it. Returns the number of claims recorded.
    pub fn restore<V, I>(&self, claims: I) -> usize
    where
        V: VolumeIdentity,
        I: IntoIterator<Item = (A, V)>,
    {
        let mut restored = 0;
        for (alloc, volume) in claims {
            self.claim(&alloc, &volume);
            restored += 1;
        }

        tracing::info!(restored, keys = self.key_count(), "Restored volume claims");
        restored
    }

    /// Lock-free view of the tracker's counters.
    pub fn metrics(&self) -> UsageMetrics {
        UsageMetrics::new(self.inner.metrics.clone())
    }
}

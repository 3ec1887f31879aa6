//! Usage tracker counters.
//!
//! Monotonic, lock-free, never reset. Misuse counters exist so tests and
//! operators can see double claims and unmatched frees; callers of
//! `claim`/`free` never observe them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter storage, cheaply cloneable.
#[derive(Clone, Default, Debug)]
pub struct UsageMetricsStorage {
    inner: Arc<Counters>,
}

#[derive(Default, Debug)]
struct Counters {
    claims_total: AtomicU64,
    frees_total: AtomicU64,
    idle_signals_total: AtomicU64,
    duplicate_claims_total: AtomicU64,
    unmatched_frees_total: AtomicU64,
}

impl UsageMetricsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_claim(&self, duplicate: bool) {
        self.inner.claims_total.fetch_add(1, Ordering::Relaxed);
        if duplicate {
            self.inner
                .duplicate_claims_total
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_free(&self, matched: bool, idle: bool) {
        self.inner.frees_total.fetch_add(1, Ordering::Relaxed);
        if !matched {
            self.inner
                .unmatched_frees_total
                .fetch_add(1, Ordering::Relaxed);
        }
        if idle {
            self.inner.idle_signals_total.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Read handle over the tracker's counters.
#[derive(Clone, Debug)]
pub struct UsageMetrics {
    storage: UsageMetricsStorage,
}

impl UsageMetrics {
    pub(crate) fn new(storage: UsageMetricsStorage) -> Self {
        Self { storage }
    }

    /// Total claims recorded, duplicates included.
    pub fn claims_total(&self) -> u64 {
        self.storage.inner.claims_total.load(Ordering::Relaxed)
    }

    pub fn frees_total(&self) -> u64 {
        self.storage.inner.frees_total.load(Ordering::Relaxed)
    }

    /// Frees that reported the volume as idle.
    pub fn idle_signals_total(&self) -> u64 {
        self.storage.inner.idle_signals_total.load(Ordering::Relaxed)
    }

    /// Claims for an allocation already present in the key's usage set.
    pub fn duplicate_claims_total(&self) -> u64 {
        self.storage
            .inner
            .duplicate_claims_total
            .load(Ordering::Relaxed)
    }

    /// Frees that removed nothing.
    pub fn unmatched_frees_total(&self) -> u64 {
        self.storage
            .inner
            .unmatched_frees_total
            .load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = UsageMetrics::new(UsageMetricsStorage::new());
        assert_eq!(metrics.claims_total(), 0);
        assert_eq!(metrics.frees_total(), 0);
        assert_eq!(metrics.idle_signals_total(), 0);
        assert_eq!(metrics.duplicate_claims_total(), 0);
        assert_eq!(metrics.unmatched_frees_total(), 0);
    }

    #[test]
    fn test_handle_sees_updates_through_shared_storage() {
        let storage = UsageMetricsStorage::new();
        let metrics = UsageMetrics::new(storage.clone());

        storage.record_claim(false);
        storage.record_claim(true);
        storage.record_free(true, false);
        storage.record_free(false, true);

        assert_eq!(metrics.claims_total(), 2);
        assert_eq!(metrics.duplicate_claims_total(), 1);
        assert_eq!(metrics.frees_total(), 2);
        assert_eq!(metrics.unmatched_frees_total(), 1);
        assert_eq!(metrics.idle_signals_total(), 1);
    }
}

//! Process-wide lookup counters.
//!
//! Cheap relaxed atomics recording what the interposed lookup path did,
//! readable as a consistent-enough snapshot from diagnostics and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the interposed lookup path.
pub struct LookupCounters {
    /// Lookups that reached the raw environment scan.
    pub lookups: AtomicU64,
    /// Lookups whose name matched the target variable exactly.
    pub target_hits: AtomicU64,
    /// Cache populations performed (0 or 1 per process).
    pub populations: AtomicU64,
    /// Target lookups answered with the raw value because synthesis
    /// exceeded the cache capacity.
    pub capacity_fallbacks: AtomicU64,
}

impl LookupCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lookups: AtomicU64::new(0),
            target_hits: AtomicU64::new(0),
            populations: AtomicU64::new(0),
            capacity_fallbacks: AtomicU64::new(0),
        }
    }
}

impl Default for LookupCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`LookupCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub lookups: u64,
    pub target_hits: u64,
    pub populations: u64,
    pub capacity_fallbacks: u64,
}

static COUNTERS: LookupCounters = LookupCounters::new();

pub fn record_lookup() {
    COUNTERS.lookups.fetch_add(1, Ordering::Relaxed);
}

pub fn record_target_hit() {
    COUNTERS.target_hits.fetch_add(1, Ordering::Relaxed);
}

pub fn record_population() {
    COUNTERS.populations.fetch_add(1, Ordering::Relaxed);
}

pub fn record_capacity_fallback() {
    COUNTERS.capacity_fallbacks.fetch_add(1, Ordering::Relaxed);
}

/// Read the process-wide counters.
#[must_use]
pub fn snapshot() -> CounterSnapshot {
    CounterSnapshot {
        lookups: COUNTERS.lookups.load(Ordering::Relaxed),
        target_hits: COUNTERS.target_hits.load(Ordering::Relaxed),
        populations: COUNTERS.populations.load(Ordering::Relaxed),
        capacity_fallbacks: COUNTERS.capacity_fallbacks.load(Ordering::Relaxed),
    }
}

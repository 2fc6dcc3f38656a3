//! Module: obs::metrics
//! Responsibility: process-local scan counters, independent of whether a tracing subscriber is installed.
//! Does not own: span-based tracing — that is `tracing::instrument` on the call sites themselves.
//! Boundary: scan/merge/plan code increments counters here; callers poll `report()` for a snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

///
/// ScanCounters
///
/// Mirrors the shape of the teacher's `EventOps` counter block
/// (`icydb-core/src/obs/metrics/mod.rs`), narrowed to what the index-scan
/// core itself can observe. Call counters are execution attempts; errors
/// still increment them, matching the teacher's stated contract.
///
#[derive(Default)]
struct ScanCounters {
    local_scans: AtomicU64,
    global_scans: AtomicU64,
    shards_scanned: AtomicU64,
    series_listed: AtomicU64,
    items_merged: AtomicU64,
    predicate_rejects: AtomicU64,
}

static COUNTERS: ScanCounters = ScanCounters {
    local_scans: AtomicU64::new(0),
    global_scans: AtomicU64::new(0),
    shards_scanned: AtomicU64::new(0),
    series_listed: AtomicU64::new(0),
    items_merged: AtomicU64::new(0),
    predicate_rejects: AtomicU64::new(0),
};

///
/// ScanEvent
///
/// The one allowed bridge between scan execution and global counter state
/// (teacher's `obs::sink` layering rule: core logic increments through this
/// enum, never the atomics directly).
///
#[derive(Clone, Copy, Debug)]
pub enum ScanEvent {
    LocalScanStarted,
    GlobalScanStarted,
    ShardScanned,
    SeriesListed { count: u64 },
    ItemMerged,
    PredicateRejected,
}

pub fn record(event: ScanEvent) {
    match event {
        ScanEvent::LocalScanStarted => COUNTERS.local_scans.fetch_add(1, Ordering::Relaxed),
        ScanEvent::GlobalScanStarted => COUNTERS.global_scans.fetch_add(1, Ordering::Relaxed),
        ScanEvent::ShardScanned => COUNTERS.shards_scanned.fetch_add(1, Ordering::Relaxed),
        ScanEvent::SeriesListed { count } => {
            COUNTERS.series_listed.fetch_add(count, Ordering::Relaxed)
        }
        ScanEvent::ItemMerged => COUNTERS.items_merged.fetch_add(1, Ordering::Relaxed),
        ScanEvent::PredicateRejected => {
            COUNTERS.predicate_rejects.fetch_add(1, Ordering::Relaxed)
        }
    };
}

///
/// ScanReport
///
/// Point-in-time snapshot for callers that want counters without wiring up
/// a tracing subscriber.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub local_scans: u64,
    pub global_scans: u64,
    pub shards_scanned: u64,
    pub series_listed: u64,
    pub items_merged: u64,
    pub predicate_rejects: u64,
}

#[must_use]
pub fn report() -> ScanReport {
    ScanReport {
        local_scans: COUNTERS.local_scans.load(Ordering::Relaxed),
        global_scans: COUNTERS.global_scans.load(Ordering::Relaxed),
        shards_scanned: COUNTERS.shards_scanned.load(Ordering::Relaxed),
        series_listed: COUNTERS.series_listed.load(Ordering::Relaxed),
        items_merged: COUNTERS.items_merged.load(Ordering::Relaxed),
        predicate_rejects: COUNTERS.predicate_rejects.load(Ordering::Relaxed),
    }
}

//! Module: series
//! Responsibility: `SeriesId`, `ShardId`, and `Series` — the identifiers the directory resolves.
//! Does not own: entity-to-series resolution (see `series::directory`).
//! Boundary: produced by `series::directory::SeriesDirectory`; consumed by scan execution.

use derive_more::{Display, From};

pub mod directory;

///
/// ShardId
///
/// Identifies a horizontal partition of series (spec Glossary). Enumerated
/// per request by the external `ExecutionContext`; opaque to the core beyond
/// equality and ordering (used as a merge tie-break component).
///
#[derive(Clone, Copy, Debug, Default, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct ShardId(pub u64);

///
/// SeriesId
///
/// 64-bit identifier derived from a stable hash of the entity key (spec §3).
/// Two entities collapse to the same `SeriesId` iff their hashes collide;
/// the directory does not guard against this beyond KV key uniqueness
/// (spec §9, "Entity hash collisions").
///
#[derive(Clone, Copy, Debug, Default, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct SeriesId(pub u64);

///
/// Series
///
/// Pair `(shard-id, series-id)` (spec §3). Cheap to copy; the block-database
/// handle the spec mentions lives entirely in the external storage layer and
/// is reached through `ExecutionContext`/`Shard`, not modeled here.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Series {
    pub shard_id: ShardId,
    pub series_id: SeriesId,
}

impl Series {
    #[must_use]
    pub const fn new(shard_id: ShardId, series_id: SeriesId) -> Self {
        Self {
            shard_id,
            series_id,
        }
    }
}

/// Total order used to break ties in the merge (spec §4.7, §8 invariant 4):
/// lower series-id first.
impl Ord for Series {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.series_id.0.cmp(&other.series_id.0)
    }
}

impl PartialOrd for Series {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

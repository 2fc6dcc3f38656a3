//! Module: context
//! Responsibility: the `ExecutionContext`/`Shard`/`SeekerBuilder` collaborator contracts.
//! Does not own: shard enumeration, series lookup, or block seekers themselves — external (spec §1).
//! Boundary: implemented by the storage layer; driven by `plan::local` and `plan::global`.

use crate::{
    entity::Entity,
    error::{ScanError, StorageError},
    expr::{BinaryPredicate, CompareOp, FieldRef},
    schema::{IndexRule, ProjectedSchema},
    series::{Series, ShardId},
};

///
/// Direction
///
/// Execution-facing scan direction, applied after any storage-level
/// pushdown (spec §4.4's `orderBy.sort`).
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Asc,
    Desc,
}

///
/// TimeRange
///
/// Closed-open `[start, end)` in nanoseconds (spec §3).
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts < self.end
    }
}

///
/// OrderBy
///
/// `{index?, sort}` (spec §4.4): order by a specific indexed field when
/// present, otherwise by time.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderBy {
    pub field: Option<FieldRef>,
    pub direction: Direction,
}

impl OrderBy {
    #[must_use]
    pub const fn by_time(direction: Direction) -> Self {
        Self {
            field: None,
            direction,
        }
    }

    #[must_use]
    pub const fn by_field(field: FieldRef, direction: Direction) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }
}

///
/// StorageCondition
///
/// The flattened storage-facing shape of one predicate (spec §4.5):
/// `tagName → (op, value-bytes)`, already translated via `Literal::to_bytes`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct StorageCondition {
    pub tag: String,
    pub op: CompareOp,
    pub value_bytes: Vec<u8>,
}

///
/// ScanItem
///
/// One raw item a seeker yields. Everything beyond these facts (payload, tag
/// values) stays opaque to this core (spec §1).
///
/// `order_key` is the canonical sort-key bytes the merge uses as its primary
/// comparator (spec §4.4 step 3 — "comparator derived from sort and, if
/// present, the selected index"): the seeker that produced this item knows
/// whether it was ordered by time or by an indexed field, and is expected to
/// emit bytes already encoded the way `value::Literal::to_bytes` encodes
/// storage conditions, with DESC already applied as an inversion — the merge
/// itself only ever compares ascending.
pub trait ScanItem: Send + 'static {
    fn timestamp_ns(&self) -> i64;
    fn item_id(&self) -> u64;
    fn order_key(&self) -> Vec<u8>;
}

///
/// SeekerBuilder
///
/// Ordered configurator stack applied to a fresh builder per series (spec
/// §9): `order_by_index`/`order_by_time` pick the scan order, `filter`
/// installs one per-rule storage condition set, `build` consumes the
/// builder and yields the resulting iterator. A mock implementation can
/// record these calls for tests without touching scan logic.
///
pub trait SeekerBuilder<I: ScanItem> {
    fn order_by_index(&mut self, field: &FieldRef, direction: Direction);
    fn order_by_time(&mut self, direction: Direction);
    fn filter(&mut self, rule: &IndexRule, conditions: &[StorageCondition]);

    #[allow(clippy::type_complexity)]
    fn build(
        self: Box<Self>,
    ) -> Result<Box<dyn Iterator<Item = Result<I, StorageError>> + Send>, StorageError>;
}

///
/// Shard
///
/// One horizontal partition of series (spec Glossary). Exposes its own
/// series directory and a seeker-builder factory scoped to one series and
/// time range (spec §6). `Send` lets `plan::local` move owned shard handles
/// into the rayon fan-out (spec §5 — parallel per-shard execution).
///
pub trait Shard<I: ScanItem>: Send {
    fn id(&self) -> ShardId;

    fn series(&self) -> &crate::series::directory::SeriesDirectory;

    fn seeker_builder(&self, series: Series, time_range: TimeRange) -> Box<dyn SeekerBuilder<I>>;
}

///
/// ExecutionContext
///
/// The storage-layer collaborator (spec §1, §6). `shards` enumerates the
/// shards an entity may live on; `global_lookup` consults a global index
/// directly, bypassing series fan-out (spec §4.6); `parse_element_id` and
/// `project_item` are the opaque tag-family/element-id helpers (spec §1).
///
pub trait ExecutionContext<I: ScanItem> {
    fn shards(&self, entity: &Entity) -> Result<Vec<Box<dyn Shard<I>>>, StorageError>;

    #[allow(clippy::type_complexity)]
    fn global_lookup(
        &self,
        rule: &IndexRule,
        predicate: &BinaryPredicate,
    ) -> Result<Box<dyn Iterator<Item = Result<I, StorageError>> + Send>, StorageError>;

    fn parse_element_id(&self, item: &I) -> Result<Vec<u8>, ScanError>;

    fn project_item(
        &self,
        item: &I,
        refs: &ProjectedSchema,
    ) -> Result<Vec<crate::projection::TagFamily>, ScanError>;
}

//! Module: plan
//! Responsibility: the analyzed, executable `Plan` — `LocalIndexScan`/`GlobalIndexScan` and their shared capability set.
//! Does not own: analysis (`plan::analyzer`) or per-variant execution (`plan::local`, `plan::global`).
//! Boundary: constructed by `plan::analyzer` from an `UnresolvedPlan`; executed once via `Plan::execute`.

pub mod analyzer;
pub mod condition;
pub mod global;
pub mod local;

use crate::{
    context::{Direction, ExecutionContext, OrderBy, ScanItem, TimeRange},
    entity::Entity,
    error::ScanError,
    expr::{BinaryPredicate, UnresolvedCondition},
    projection::Element,
    schema::{IndexRule, ProjectedSchema},
};
use condition::ConditionMap;

///
/// StreamMetadata
///
/// Identifies the stream a plan targets (spec §4.9 — "metadata group+name").
///
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StreamMetadata {
    pub group: String,
    pub name: String,
}

impl StreamMetadata {
    #[must_use]
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

///
/// ScanLimits
///
/// Explicit, caller-supplied execution knobs (SPEC_FULL §10.4): a heap
/// pre-allocation hint for the merge and an optional cap on the number of
/// elements returned. Threaded through both constructors; the core takes no
/// ambient configuration beyond this (spec §6).
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanLimits {
    pub merge_heap_hint: usize,
    pub max_elements: Option<usize>,
}

impl ScanLimits {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            merge_heap_hint: 16,
            max_elements: None,
        }
    }
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self::unbounded()
    }
}

///
/// UnresolvedPlan
///
/// Raw request shape before analysis (spec §4.3): `{timeRange, metadata,
/// conditions, projectionFields, entity, orderBy}`. `order_by` is `None` for
/// `GlobalIndexScan` requests — a global lookup defines its own iteration
/// order and bypasses series fan-out entirely (spec §4.6).
///
#[derive(Clone, Debug)]
pub struct UnresolvedPlan {
    pub metadata: StreamMetadata,
    pub time_range: TimeRange,
    pub conditions: Vec<UnresolvedCondition>,
    pub projection: Vec<(String, String)>,
    pub entity: Entity,
    pub order_by: Option<OrderBy>,
    pub limits: ScanLimits,
}

/// `IndexScan(startTime, endTime, metadata, conditions, entity, orderBy,
/// projection…) → UnresolvedPlan` (spec §6).
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn index_scan(
    time_range: TimeRange,
    metadata: StreamMetadata,
    conditions: Vec<UnresolvedCondition>,
    entity: Entity,
    order_by: OrderBy,
    projection: Vec<(String, String)>,
    limits: ScanLimits,
) -> UnresolvedPlan {
    UnresolvedPlan {
        metadata,
        time_range,
        conditions,
        projection,
        entity,
        order_by: Some(order_by),
        limits,
    }
}

/// `GlobalIndexScan(metadata, conditions, projection…) → UnresolvedPlan`
/// (spec §6). The analyzer never consults `entity`/`order_by` on the global
/// path (spec §4.6), so they are filled with harmless placeholders here.
#[must_use]
pub fn global_index_scan(
    metadata: StreamMetadata,
    conditions: Vec<UnresolvedCondition>,
    projection: Vec<(String, String)>,
    limits: ScanLimits,
) -> UnresolvedPlan {
    UnresolvedPlan {
        metadata,
        time_range: TimeRange::new(0, 0),
        conditions,
        projection,
        entity: Entity::new(Vec::new()),
        order_by: None,
        limits,
    }
}

///
/// LocalIndexScan
///
/// Analyzed plan for a series-local scan (spec §4.4).
///
#[derive(Clone, Debug)]
pub struct LocalIndexScan {
    pub metadata: StreamMetadata,
    pub time_range: TimeRange,
    pub schema: ProjectedSchema,
    pub condition_map: ConditionMap,
    pub entity: Entity,
    pub order_by: OrderBy,
    pub limits: ScanLimits,
}

///
/// GlobalIndexScan
///
/// Analyzed plan for a global-index lookup (spec §4.6): a single rule, a
/// single predicate, no time narrowing — global indices are assumed
/// time-agnostic (spec §9, "Unresolved span coverage").
///
#[derive(Clone, Debug)]
pub struct GlobalIndexScan {
    pub metadata: StreamMetadata,
    pub rule: IndexRule,
    pub predicate: BinaryPredicate,
    pub schema: ProjectedSchema,
    pub limits: ScanLimits,
}

///
/// Plan
///
/// Tagged variant over the two analyzed, executable plan shapes (spec §9 —
/// "Polymorphic plan tree"). Immutable after analysis, freely shareable
/// across execution tasks (spec §5).
///
#[derive(Clone, Debug)]
pub enum Plan {
    Local(LocalIndexScan),
    Global(GlobalIndexScan),
}

/// Stable plan-kind discriminant (spec §4.9/§9 — `Type()`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlanType {
    LocalIndexScan,
    GlobalIndexScan,
}

impl Plan {
    #[must_use]
    pub const fn plan_type(&self) -> PlanType {
        match self {
            Self::Local(_) => PlanType::LocalIndexScan,
            Self::Global(_) => PlanType::GlobalIndexScan,
        }
    }

    /// Leaf plans have no children (spec §3 — "Children (leaves here)").
    #[must_use]
    pub fn children(&self) -> &[Plan] {
        &[]
    }

    #[must_use]
    pub fn schema(&self) -> &ProjectedSchema {
        match self {
            Self::Local(p) => &p.schema,
            Self::Global(p) => &p.schema,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &StreamMetadata {
        match self {
            Self::Local(p) => &p.metadata,
            Self::Global(p) => &p.metadata,
        }
    }

    /// Stable, human-readable textual form (spec §4.9): field order is fixed
    /// (start, end, group, name, conditions joined by `AND`, projection
    /// joined by `,`) so `Equal` plans always stringify identically (spec §8
    /// invariant 5).
    #[must_use]
    pub fn to_plan_string(&self) -> String {
        match self {
            Self::Local(p) => {
                let conditions = p
                    .condition_map
                    .iter()
                    .flat_map(|(_, predicates)| predicates.iter())
                    .map(format_predicate)
                    .collect::<Vec<_>>()
                    .join(" AND ");
                format!(
                    "LocalIndexScan(start={}, end={}, group={}, name={}, conditions=[{}], projection=[{}])",
                    p.time_range.start,
                    p.time_range.end,
                    p.metadata.group,
                    p.metadata.name,
                    conditions,
                    format_projection(&p.schema),
                )
            }
            Self::Global(p) => {
                format!(
                    "GlobalIndexScan(start=0, end=0, group={}, name={}, conditions=[{}], projection=[{}])",
                    p.metadata.group,
                    p.metadata.name,
                    format_predicate(&p.predicate),
                    format_projection(&p.schema),
                )
            }
        }
    }

    /// Execute this plan against a storage collaborator, returning elements
    /// in merge order (spec §4.4 step 4 / §4.6).
    pub fn execute<I: ScanItem>(&self, ctx: &dyn ExecutionContext<I>) -> Result<Vec<Element>, ScanError> {
        match self {
            Self::Local(p) => local::execute(p, ctx),
            Self::Global(p) => global::execute(p, ctx),
        }
    }
}

fn format_predicate(predicate: &BinaryPredicate) -> String {
    format!(
        "{}.{} {:?} {:?}",
        predicate.field.family, predicate.field.tag, predicate.op, predicate.value
    )
}

fn format_projection(schema: &ProjectedSchema) -> String {
    schema
        .refs
        .iter()
        .map(|r| format!("{}.{}", r.family, r.tag))
        .collect::<Vec<_>>()
        .join(",")
}

/// `Equal` (spec §4.9): same variant and all analyzed fields compare equal.
/// `IndexRule` compares by identity (its `PartialEq` keys on `RuleId` — spec
/// §9); `ConditionMap` derives `PartialEq` over its entries in insertion
/// order, so two maps built from the same classification order compare
/// equal.
impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Local(a), Self::Local(b)) => {
                a.metadata == b.metadata
                    && a.time_range == b.time_range
                    && a.entity == b.entity
                    && a.schema == b.schema
                    && a.condition_map == b.condition_map
                    && a.order_by == b.order_by
            }
            (Self::Global(a), Self::Global(b)) => {
                a.metadata == b.metadata
                    && a.rule == b.rule
                    && a.predicate == b.predicate
                    && a.schema == b.schema
            }
            _ => false,
        }
    }
}

impl Eq for Plan {}

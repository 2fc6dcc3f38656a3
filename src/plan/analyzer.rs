//! Module: plan::analyzer
//! Responsibility: the three-step expression resolution & analysis pipeline (spec §4.3).
//! Does not own: execution — only produces an analyzed `Plan`.
//! Boundary: consumes an `UnresolvedPlan` and a `Schema`; returns a `Plan` or a `ScanError`.

use crate::{
    context::{Direction, OrderBy},
    error::ScanError,
    expr::{resolve_condition, BinaryPredicate},
    obs::metrics::{self, ScanEvent},
    plan::{condition::ConditionMap, GlobalIndexScan, LocalIndexScan, Plan, UnresolvedPlan},
    schema::{IndexLocation, IndexRule, Schema},
};

/// Analyze `unresolved` against `schema`, producing either a `LocalIndexScan`
/// or a `GlobalIndexScan` (spec §4.3).
#[tracing::instrument(skip(unresolved, schema), fields(group = %unresolved.metadata.group, name = %unresolved.metadata.name, conditions = unresolved.conditions.len()))]
pub fn analyze(unresolved: UnresolvedPlan, schema: &dyn Schema) -> Result<Plan, ScanError> {
    let resolved = resolve_all(unresolved.conditions, schema)?;
    let (condition_map, global_conditions) = classify_all(resolved, schema)?;

    if !global_conditions.is_empty() {
        return route_global(unresolved.metadata, global_conditions, &unresolved.projection, schema, unresolved.limits);
    }

    let refs = schema.create_ref(&unresolved.projection)?;
    let projected = schema.proj(&refs);
    let order_by = unresolved
        .order_by
        .unwrap_or_else(|| OrderBy::by_time(Direction::Asc));

    Ok(Plan::Local(LocalIndexScan {
        metadata: unresolved.metadata,
        time_range: unresolved.time_range,
        schema: projected,
        condition_map,
        entity: unresolved.entity,
        order_by,
        limits: unresolved.limits,
    }))
}

/// Step 1 — resolve: bind every condition's raw tag against the schema.
/// Unresolvable tags fail with `IndexNotDefined(tag)` (spec §4.3 Step 1 and
/// end-to-end scenario S6 both name this kind for an unbindable tag).
/// `expr::resolve_condition` itself returns the finer-grained
/// `SchemaResolution` for callers that want it standalone; this pipeline
/// remaps it to match the scan core's public contract. `SchemaResolution`
/// remains reachable through `Schema::create_ref` when a projection
/// reference names an unrecognized family/tag.
fn resolve_all(
    conditions: Vec<crate::expr::UnresolvedCondition>,
    schema: &dyn Schema,
) -> Result<Vec<BinaryPredicate>, ScanError> {
    conditions
        .into_iter()
        .map(|condition| {
            let tag = condition.tag.clone();
            resolve_condition(|t| schema.resolve_field(t), condition)
                .map_err(|_| ScanError::IndexNotDefined(tag))
        })
        .collect()
}

/// Step 2 — classify: route each resolved predicate by its index rule's
/// location (spec §4.3 Step 2).
#[allow(clippy::type_complexity)]
fn classify_all(
    predicates: Vec<BinaryPredicate>,
    schema: &dyn Schema,
) -> Result<(ConditionMap, Vec<(IndexRule, BinaryPredicate)>), ScanError> {
    let mut condition_map = ConditionMap::new();
    let mut global_conditions = Vec::new();

    for predicate in predicates {
        let rule = schema.index_defined(&predicate.field).ok_or_else(|| {
            metrics::record(ScanEvent::PredicateRejected);
            ScanError::IndexNotDefined(predicate.field.tag.clone())
        })?;

        match rule.location {
            IndexLocation::SeriesLocal => condition_map.push(rule, predicate),
            IndexLocation::Global => global_conditions.push((rule, predicate)),
        }
    }

    Ok((condition_map, global_conditions))
}

/// Step 3 (global branch) — reject plans touching more than one distinct
/// global rule (spec §4.3 Step 3: `MultipleGlobalIndexes`); otherwise build
/// the single-rule, single-predicate `GlobalIndexScan`.
fn route_global(
    metadata: crate::plan::StreamMetadata,
    global_conditions: Vec<(IndexRule, BinaryPredicate)>,
    projection: &[(String, String)],
    schema: &dyn Schema,
    limits: crate::plan::ScanLimits,
) -> Result<Plan, ScanError> {
    let first_id = global_conditions[0].0.id;
    if global_conditions.iter().any(|(rule, _)| rule.id != first_id) {
        return Err(ScanError::MultipleGlobalIndexes);
    }

    let (rule, predicate) = global_conditions
        .into_iter()
        .next()
        .expect("checked non-empty by caller");

    let refs = schema.create_ref(projection)?;
    let projected = schema.proj(&refs);

    Ok(Plan::Global(GlobalIndexScan {
        metadata,
        rule,
        predicate,
        schema: projected,
        limits,
    }))
}

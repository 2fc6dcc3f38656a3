//! Module: plan::global
//! Responsibility: execute an analyzed `GlobalIndexScan` (spec §4.6).
//! Does not own: plan analysis — `plan::analyzer` produces the `GlobalIndexScan` this consumes.
//! Boundary: invoked by `Plan::execute`; drives `ExecutionContext::global_lookup`.

use crate::{
    context::{ExecutionContext, ScanItem},
    error::ScanError,
    obs::metrics::{self, ScanEvent},
    plan::GlobalIndexScan,
    projection::{self, Element},
};

/// Execute a global-index lookup: consult the global index directly via
/// `ExecutionContext::global_lookup`, bypassing series fan-out entirely. No
/// time-range narrowing is performed — global indices are assumed
/// time-agnostic (spec §4.6, §9 "Unresolved span coverage").
#[tracing::instrument(skip(plan, ctx), fields(group = %plan.metadata.group, name = %plan.metadata.name, rule = %plan.rule.name))]
pub fn execute<I: ScanItem>(
    plan: &GlobalIndexScan,
    ctx: &dyn ExecutionContext<I>,
) -> Result<Vec<Element>, ScanError> {
    metrics::record(ScanEvent::GlobalScanStarted);

    let items = ctx
        .global_lookup(&plan.rule, &plan.predicate)
        .map_err(ScanError::from_storage)?;

    let mut elements = Vec::new();
    for item in items {
        let item = item.map_err(ScanError::from_storage)?;
        let element = projection::project(ctx, &item, &plan.schema)?;
        metrics::record(ScanEvent::ItemMerged);
        elements.push(element);

        if let Some(max) = plan.limits.max_elements {
            if elements.len() >= max {
                break;
            }
        }
    }

    Ok(elements)
}

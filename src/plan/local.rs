//! Module: plan::local
//! Responsibility: execute an analyzed `LocalIndexScan` (spec §4.4).
//! Does not own: plan analysis — `plan::analyzer` produces the `LocalIndexScan` this consumes.
//! Boundary: invoked by `Plan::execute`; drives `ExecutionContext`/`Shard`/`SeekerBuilder` and `merge::KWayMerge`.

use crate::{
    context::{ExecutionContext, Shard, ScanItem, TimeRange},
    error::{ScanError, StorageError},
    merge::{KWayMerge, MergeSource},
    obs::metrics::{self, ScanEvent},
    path::Path,
    plan::{condition::ConditionMap, LocalIndexScan},
    projection::{self, Element},
};
use rayon::prelude::*;

/// Execute the full contract of spec §4.4: enumerate shards, list series per
/// shard, build a configured seeker per series, fan the per-shard work out
/// in parallel (spec §5 — "parallel shard fan-out is allowed and expected"),
/// concatenate the resulting iterators into the merge, and project each
/// merged item.
#[tracing::instrument(skip(plan, ctx), fields(group = %plan.metadata.group, name = %plan.metadata.name))]
pub fn execute<I: ScanItem>(
    plan: &LocalIndexScan,
    ctx: &dyn ExecutionContext<I>,
) -> Result<Vec<Element>, ScanError> {
    metrics::record(ScanEvent::LocalScanStarted);

    let shards = ctx.shards(&plan.entity).map_err(ScanError::from_storage)?;
    let path = Path::new(&plan.entity);

    let per_shard: Result<Vec<Vec<MergeSource<I>>>, StorageError> = shards
        .into_par_iter()
        .map(|shard| scan_shard(shard.as_ref(), &path, plan.time_range, plan))
        .collect();

    let sources: Vec<MergeSource<I>> = per_shard
        .map_err(ScanError::from_storage)?
        .into_iter()
        .flatten()
        .collect();

    let merge = KWayMerge::new(sources, plan.limits.merge_heap_hint).map_err(ScanError::from_storage)?;

    let mut elements = Vec::new();
    for item in merge {
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

/// One shard's contribution (spec §4.4 steps 2a–2c): list series matching
/// `path`, build a stacked-configuration seeker per series, collect the
/// resulting iterators as merge sources.
fn scan_shard<I: ScanItem>(
    shard: &dyn Shard<I>,
    path: &Path,
    time_range: TimeRange,
    plan: &LocalIndexScan,
) -> Result<Vec<MergeSource<I>>, StorageError> {
    let series_list = shard.series().list(path)?;
    metrics::record(ScanEvent::ShardScanned);
    metrics::record(ScanEvent::SeriesListed {
        count: series_list.len() as u64,
    });

    let mut sources = Vec::with_capacity(series_list.len());
    for series in series_list {
        let mut builder = shard.seeker_builder(series, time_range);

        // Ordering: by the selected index when present, else by time (spec §4.4 step 2b).
        match &plan.order_by.field {
            Some(field) => builder.order_by_index(field, plan.order_by.direction),
            None => builder.order_by_time(plan.order_by.direction),
        }

        // Filter: one per-rule storage condition set per entry in the condition map.
        for (rule, predicates) in plan.condition_map.iter() {
            let conditions = ConditionMap::storage_conditions(predicates);
            builder.filter(rule, &conditions);
        }

        let iter = builder.build()?;
        sources.push(MergeSource { series, iter });
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{Direction, OrderBy, SeekerBuilder, StorageCondition},
        entity::{Entity, Entry},
        expr::FieldRef,
        plan::{ScanLimits, StreamMetadata},
        projection::TagFamily,
        schema::{IndexRule, ProjectedSchema},
        series::{directory::SeriesDirectory, Series, SeriesId, ShardId},
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[derive(Clone)]
    struct Item {
        ts: i64,
        id: u64,
    }

    impl ScanItem for Item {
        fn timestamp_ns(&self) -> i64 {
            self.ts
        }
        fn item_id(&self) -> u64 {
            self.id
        }
        fn order_key(&self) -> Vec<u8> {
            self.ts.to_be_bytes().to_vec()
        }
    }

    struct RecordingBuilder {
        items: Vec<Item>,
        order_by_time_calls: Arc<AtomicUsize>,
        filter_calls: Arc<AtomicUsize>,
    }

    impl SeekerBuilder<Item> for RecordingBuilder {
        fn order_by_index(&mut self, _field: &FieldRef, _direction: Direction) {}

        fn order_by_time(&mut self, _direction: Direction) {
            self.order_by_time_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn filter(&mut self, _rule: &IndexRule, _conditions: &[StorageCondition]) {
            self.filter_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn build(
            self: Box<Self>,
        ) -> Result<Box<dyn Iterator<Item = Result<Item, StorageError>> + Send>, StorageError> {
            Ok(Box::new(self.items.into_iter().map(Ok)))
        }
    }

    struct FakeShard {
        id: ShardId,
        dir: SeriesDirectory,
        items: Vec<(Entity, Vec<Item>)>,
        order_by_time_calls: Arc<AtomicUsize>,
        filter_calls: Arc<AtomicUsize>,
    }

    impl Shard<Item> for FakeShard {
        fn id(&self) -> ShardId {
            self.id
        }

        fn series(&self) -> &SeriesDirectory {
            &self.dir
        }

        fn seeker_builder(&self, series: Series, _time_range: TimeRange) -> Box<dyn SeekerBuilder<Item>> {
            let items = self
                .items
                .iter()
                .find(|(entity, _)| self.dir.get(entity).map(|s| s == series).unwrap_or(false))
                .map(|(_, items)| items.clone())
                .unwrap_or_default();
            Box::new(RecordingBuilder {
                items,
                order_by_time_calls: Arc::clone(&self.order_by_time_calls),
                filter_calls: Arc::clone(&self.filter_calls),
            })
        }
    }

    fn shard_with(shard_id: u64, entries: Vec<(Entity, Vec<Item>)>) -> FakeShard {
        shard_with_counters(shard_id, entries, Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    fn shard_with_counters(
        shard_id: u64,
        entries: Vec<(Entity, Vec<Item>)>,
        order_by_time_calls: Arc<AtomicUsize>,
        filter_calls: Arc<AtomicUsize>,
    ) -> FakeShard {
        let dir = SeriesDirectory::new(ShardId(shard_id));
        for (entity, _) in &entries {
            dir.get(entity).unwrap();
        }
        FakeShard {
            id: ShardId(shard_id),
            dir,
            items: entries,
            order_by_time_calls,
            filter_calls,
        }
    }

    struct FakeCtx {
        shards: std::cell::RefCell<Vec<Option<Box<dyn Shard<Item>>>>>,
    }

    impl ExecutionContext<Item> for FakeCtx {
        fn shards(&self, _entity: &Entity) -> Result<Vec<Box<dyn Shard<Item>>>, StorageError> {
            let mut slot = self.shards.borrow_mut();
            Ok(slot.iter_mut().filter_map(std::mem::take).collect())
        }

        fn global_lookup(
            &self,
            _rule: &IndexRule,
            _predicate: &crate::expr::BinaryPredicate,
        ) -> Result<Box<dyn Iterator<Item = Result<Item, StorageError>> + Send>, StorageError> {
            Ok(Box::new(std::iter::empty()))
        }

        fn parse_element_id(&self, item: &Item) -> Result<Vec<u8>, ScanError> {
            Ok(item.id.to_be_bytes().to_vec())
        }

        fn project_item(&self, _item: &Item, _refs: &ProjectedSchema) -> Result<Vec<TagFamily>, ScanError> {
            Ok(Vec::new())
        }
    }

    fn entity(service: &str, instance: &str) -> Entity {
        Entity::new(vec![Entry::concrete(service), Entry::concrete(instance)])
    }

    fn plan() -> LocalIndexScan {
        LocalIndexScan {
            metadata: StreamMetadata::new("svc", "spans"),
            time_range: TimeRange::new(100, 400),
            schema: ProjectedSchema::new(Vec::new()),
            condition_map: ConditionMap::new(),
            entity: entity("svcA", "instA"),
            order_by: OrderBy::by_time(Direction::Asc),
            limits: ScanLimits::unbounded(),
        }
    }

    #[test]
    fn local_scan_merges_items_across_shards_in_ascending_time_order() {
        let a = shard_with(
            0,
            vec![(entity("svcA", "instA"), vec![Item { ts: 100, id: 1 }, Item { ts: 300, id: 2 }])],
        );
        let b = shard_with(
            1,
            vec![(entity("svcA", "instA"), vec![Item { ts: 150, id: 3 }])],
        );
        let ctx = FakeCtx {
            shards: std::cell::RefCell::new(vec![Some(Box::new(a)), Some(Box::new(b))]),
        };

        let elements = execute(&plan(), &ctx).unwrap();
        let timestamps: Vec<_> = elements.iter().map(|e| e.timestamp_ns).collect();
        assert_eq!(timestamps, vec![100, 150, 300]);
    }

    #[test]
    fn local_scan_configures_every_seeker_with_time_order_and_no_conditions() {
        let order_by_time_calls = Arc::new(AtomicUsize::new(0));
        let filter_calls = Arc::new(AtomicUsize::new(0));
        let a = shard_with_counters(
            0,
            vec![(entity("svcA", "instA"), vec![Item { ts: 1, id: 1 }])],
            Arc::clone(&order_by_time_calls),
            Arc::clone(&filter_calls),
        );
        let ctx = FakeCtx {
            shards: std::cell::RefCell::new(vec![Some(Box::new(a))]),
        };

        execute(&plan(), &ctx).unwrap();
        assert_eq!(order_by_time_calls.load(Ordering::SeqCst), 1);
        assert_eq!(filter_calls.load(Ordering::SeqCst), 0, "empty condition map installs no filters");
    }

    #[test]
    fn max_elements_caps_the_merged_result() {
        let a = shard_with(
            0,
            vec![(
                entity("svcA", "instA"),
                vec![Item { ts: 1, id: 1 }, Item { ts: 2, id: 2 }, Item { ts: 3, id: 3 }],
            )],
        );
        let ctx = FakeCtx {
            shards: std::cell::RefCell::new(vec![Some(Box::new(a))]),
        };

        let mut capped = plan();
        capped.limits.max_elements = Some(2);

        let elements = execute(&capped, &ctx).unwrap();
        assert_eq!(elements.len(), 2);
    }

    struct CancellingBuilder;

    impl SeekerBuilder<Item> for CancellingBuilder {
        fn order_by_index(&mut self, _field: &FieldRef, _direction: Direction) {}
        fn order_by_time(&mut self, _direction: Direction) {}
        fn filter(&mut self, _rule: &IndexRule, _conditions: &[StorageCondition]) {}

        fn build(
            self: Box<Self>,
        ) -> Result<Box<dyn Iterator<Item = Result<Item, StorageError>> + Send>, StorageError> {
            Err(StorageError::Cancelled("seeker build aborted".into()))
        }
    }

    struct CancellingShard {
        id: ShardId,
        dir: SeriesDirectory,
    }

    impl Shard<Item> for CancellingShard {
        fn id(&self) -> ShardId {
            self.id
        }

        fn series(&self) -> &SeriesDirectory {
            &self.dir
        }

        fn seeker_builder(&self, _series: Series, _time_range: TimeRange) -> Box<dyn SeekerBuilder<Item>> {
            Box::new(CancellingBuilder)
        }
    }

    #[test]
    fn cancelled_seeker_build_surfaces_as_scan_error_cancelled() {
        let dir = SeriesDirectory::new(ShardId(0));
        dir.get(&entity("svcA", "instA")).unwrap();
        let shard = CancellingShard { id: ShardId(0), dir };
        let ctx = FakeCtx {
            shards: std::cell::RefCell::new(vec![Some(Box::new(shard))]),
        };

        let err = execute(&plan(), &ctx).unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
    }
}

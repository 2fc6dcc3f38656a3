//! Module: merge
//! Responsibility: k-way merge of per-series iterators into one globally-ordered iterator.
//! Does not own: how the per-item order key is produced — `ScanItem::order_key` does that.
//! Boundary: consumes boxed iterators from seekers/global lookup; feeds `projection::project`.

use crate::{context::ScanItem, error::StorageError, series::Series};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// One source iterator contributed by a single series (spec §4.7).
pub struct MergeSource<I: ScanItem> {
    pub series: Series,
    pub iter: Box<dyn Iterator<Item = Result<I, StorageError>> + Send>,
}

/// Total-order key for one queued item: `ScanItem::order_key`'s bytes, then
/// the deterministic tie-break (spec §4.7, §8 invariant 4): lower series-id
/// first, then lower item-id first. Field declaration order here doubles as
/// the comparison order via the derived `Ord`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd)]
struct MergeKey {
    primary: Vec<u8>,
    series_id: u64,
    item_id: u64,
}

struct HeapEntry<I> {
    key: MergeKey,
    item: I,
    source: usize,
}


impl<I> PartialEq for HeapEntry<I> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl<I> Eq for HeapEntry<I> {}

impl<I> PartialOrd for HeapEntry<I> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<I> Ord for HeapEntry<I> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

///
/// KWayMerge
///
/// Min-heap of `(head-item, source-iterator)` pairs (spec §4.7). `next`
/// pops the top; if its source has another item, the replacement is pushed.
/// Passive cancellation: dropping the merge drops every boxed source
/// iterator, releasing whatever resources they hold (spec §4.7, §9).
///
pub struct KWayMerge<I: ScanItem> {
    heap: BinaryHeap<Reverse<HeapEntry<I>>>,
    sources: Vec<Box<dyn Iterator<Item = Result<I, StorageError>> + Send>>,
    series: Vec<Series>,
}

impl<I: ScanItem> KWayMerge<I> {
    /// Build the merge, pulling one item from every source to seed the heap.
    /// Any source-level error aborts construction (spec §4.4 — "any
    /// shard-level or seeker-level error aborts the scan"). `heap_hint`
    /// pre-sizes the heap (`ScanLimits::merge_heap_hint`, SPEC_FULL §10.4).
    pub fn new(sources: Vec<MergeSource<I>>, heap_hint: usize) -> Result<Self, StorageError> {
        let mut merge = Self {
            heap: BinaryHeap::with_capacity(sources.len().max(heap_hint)),
            sources: Vec::with_capacity(sources.len()),
            series: Vec::with_capacity(sources.len()),
        };

        for source in sources {
            let index = merge.sources.len();
            merge.sources.push(source.iter);
            merge.series.push(source.series);
            merge.pull_into_heap(index)?;
        }

        Ok(merge)
    }

    fn pull_into_heap(&mut self, source: usize) -> Result<(), StorageError> {
        if let Some(next) = self.sources[source].next() {
            let item = next?;
            let key = MergeKey {
                primary: item.order_key(),
                series_id: self.series[source].series_id.0,
                item_id: item.item_id(),
            };
            self.heap.push(Reverse(HeapEntry {
                key,
                item,
                source,
            }));
        }
        Ok(())
    }
}

impl<I: ScanItem> Iterator for KWayMerge<I> {
    type Item = Result<I, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse(entry) = self.heap.pop()?;
        if let Err(err) = self.pull_into_heap(entry.source) {
            return Some(Err(err));
        }
        Some(Ok(entry.item))
    }
}

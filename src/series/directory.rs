//! Module: series::directory
//! Responsibility: map entity → series, and list series matching a partial path.
//! Does not own: block-database storage — the directory holds only identity metadata.
//! Boundary: one directory per shard; reached through `Shard::series()` (see `context`).

use crate::{
    entity::Entity,
    error::StorageError,
    path::Path,
    series::{Series, SeriesId, ShardId},
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Derive the 64-bit `SeriesId` for a full entity key (spec §3): a stable
/// hash of the concatenated per-entry hashes, truncated the same way
/// `path::hash_entry_bytes` truncates a value digest.
#[must_use]
fn series_id_for_key(key: &[u8]) -> SeriesId {
    let digest = Sha256::digest(key);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    SeriesId(u64::from_be_bytes(bytes))
}

///
/// SeriesDirectory
///
/// Contract (spec §4.2):
/// - `get`/`get_by_hash_key` resolve or atomically create a series for a
///   full entity key; concurrent gets for the same entity converge to the
///   same id, serialized by a directory-wide lock on the insertion path.
/// - `get_by_id` returns a handle with no lookup (trusted id).
/// - `list` resolves a (possibly partial) `Path` to every registered series
///   whose key matches under the mask/template test.
///
/// Failures: a KV miss on the point-get path of `list` is an empty result,
/// not an error (spec §4.2). Implemented here as an in-memory ordered map —
/// the teacher's real backing stores (`StoreRegistry`, canister stable
/// memory) are out of scope (spec §1, "physical time-series store").
///
pub struct SeriesDirectory {
    shard_id: ShardId,
    by_key: Mutex<BTreeMap<Vec<u8>, SeriesId>>,
}

impl SeriesDirectory {
    #[must_use]
    pub fn new(shard_id: ShardId) -> Self {
        Self {
            shard_id,
            by_key: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resolve or create the series for `entity`. `entity` must be full
    /// (spec §4.2 operates on a concrete entity key); partial entities
    /// should go through `list` instead.
    pub fn get(&self, entity: &Entity) -> Result<Series, StorageError> {
        debug_assert!(
            entity.is_full(),
            "SeriesDirectory::get requires a fully-concrete entity; use list() for partial paths",
        );
        let path = Path::new(entity);
        self.get_by_hash_key(&path.template)
    }

    /// Same as `get`, but accepts an already-hashed entity key (the full
    /// `Path::template` of a concrete entity).
    pub fn get_by_hash_key(&self, key: &[u8]) -> Result<Series, StorageError> {
        let series_id = series_id_for_key(key);

        // Single lock serializes new-series insertion (spec §5); reads that
        // hit an existing entry still take the lock here since the backing
        // map has no separate lock-free read path in this in-memory form.
        let mut map = self
            .by_key
            .lock()
            .map_err(|_| StorageError::SeriesListing("series directory lock poisoned".into()))?;
        map.entry(key.to_vec()).or_insert(series_id);

        Ok(Series::new(self.shard_id, series_id))
    }

    /// Return a handle with no lookup — the id is trusted as-is.
    #[must_use]
    pub const fn get_by_id(&self, series_id: SeriesId) -> Series {
        Series::new(self.shard_id, series_id)
    }

    /// List series matching `path`. Full paths perform a single point
    /// lookup on `path.prefix`; partial paths scan keys with that prefix and
    /// admit only those satisfying `(k & mask) == template`. Result order is
    /// scan order (ascending key bytes here); callers needing a total order
    /// should sort by `Series`'s `Ord` impl (series-id).
    pub fn list(&self, path: &Path) -> Result<Vec<Series>, StorageError> {
        let map = self
            .by_key
            .lock()
            .map_err(|_| StorageError::SeriesListing("series directory lock poisoned".into()))?;

        if path.is_full {
            return Ok(map
                .get(&path.prefix)
                .map(|id| vec![Series::new(self.shard_id, *id)])
                .unwrap_or_default());
        }

        Ok(map
            .range(path.prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&path.prefix))
            .filter(|(key, _)| path.matches(key))
            .map(|(_, id)| Series::new(self.shard_id, *id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entry;

    #[test]
    fn get_is_idempotent_for_the_same_entity() {
        let dir = SeriesDirectory::new(ShardId(0));
        let entity = Entity::new(vec![Entry::concrete("svcA"), Entry::concrete("instA")]);
        let first = dir.get(&entity).unwrap();
        let second = dir.get(&entity).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn list_with_full_path_is_a_point_get() {
        let dir = SeriesDirectory::new(ShardId(0));
        let entity = Entity::new(vec![Entry::concrete("svcA"), Entry::concrete("instA")]);
        let created = dir.get(&entity).unwrap();

        let path = Path::new(&entity);
        let found = dir.list(&path).unwrap();
        assert_eq!(found, vec![created]);
    }

    #[test]
    fn list_with_partial_path_matches_registered_series() {
        let dir = SeriesDirectory::new(ShardId(0));
        let a = Entity::new(vec![Entry::concrete("svcA"), Entry::concrete("instB")]);
        let b = Entity::new(vec![Entry::concrete("svcZ"), Entry::concrete("instB")]);
        let c = Entity::new(vec![Entry::concrete("svcA"), Entry::concrete("instC")]);
        let sa = dir.get(&a).unwrap();
        let sb = dir.get(&b).unwrap();
        let _ = dir.get(&c).unwrap();

        let partial = Entity::new(vec![Entry::Any, Entry::concrete("instB")]);
        let mut found = dir.list(&Path::new(&partial)).unwrap();
        found.sort();
        let mut expected = vec![sa, sb];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn list_on_unknown_full_path_is_empty_not_error() {
        let dir = SeriesDirectory::new(ShardId(0));
        let entity = Entity::new(vec![Entry::concrete("svcA"), Entry::concrete("instA")]);
        let path = Path::new(&entity);
        assert_eq!(dir.list(&path).unwrap(), Vec::new());
    }

    #[test]
    fn get_by_id_performs_no_lookup() {
        let dir = SeriesDirectory::new(ShardId(3));
        let series = dir.get_by_id(SeriesId(42));
        assert_eq!(series.shard_id, ShardId(3));
        assert_eq!(series.series_id, SeriesId(42));
    }
}

//! Module: error
//! Responsibility: crate-level error taxonomy surfaced by analysis and execution.
//! Does not own: retry policy — callers decide whether/how to retry.
//! Boundary: component errors (storage, projection) wrap into `ScanError` at the seam.

use thiserror::Error as ThisError;

///
/// ScanError
///
/// Stable error kinds for the index-scan core (spec §7). Analysis errors
/// (`IndexNotDefined`, `MultipleGlobalIndexes`, `SchemaResolution`) abort plan
/// construction with no side effects. Execution errors (`Storage`,
/// `Projection`, `Cancelled`) abort the current request; partial element
/// lists are never returned.
///

#[derive(Debug, ThisError)]
pub enum ScanError {
    #[error("index not defined for tag {0:?}")]
    IndexNotDefined(String),

    #[error("query references more than one global index")]
    MultipleGlobalIndexes,

    #[error("schema resolution failed: {0}")]
    SchemaResolution(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("projection failed: {0}")]
    Projection(String),

    #[error("scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// Map a storage-layer error onto the crate error surface, keeping
    /// `Cancelled` a distinct top-level kind (spec §7) instead of letting it
    /// wrap generically into `Storage` the way every other `StorageError`
    /// variant does.
    pub(crate) fn from_storage(err: StorageError) -> Self {
        match err {
            StorageError::Cancelled(reason) => {
                tracing::debug!(reason = %reason, "storage cancellation surfaced as ScanError::Cancelled");
                Self::Cancelled
            }
            other => Self::Storage(other),
        }
    }
}

///
/// StorageError
///
/// Wraps failures surfaced by the `ExecutionContext` collaborator: shard
/// enumeration, series listing, and seeker construction/advancement. The
/// core does not interpret these beyond propagating them — storage-layer
/// internals are out of scope (spec §1).
///

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("shard enumeration failed: {0}")]
    ShardEnumeration(String),

    #[error("series listing failed: {0}")]
    SeriesListing(String),

    #[error("seeker construction failed: {0}")]
    SeekerBuild(String),

    #[error("seeker advance failed: {0}")]
    SeekerAdvance(String),

    #[error("storage operation cancelled: {0}")]
    Cancelled(String),
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_cancelled_maps_to_scan_error_cancelled() {
        let err = ScanError::from_storage(StorageError::Cancelled("shutdown requested".into()));
        assert!(matches!(err, ScanError::Cancelled));
    }

    #[test]
    fn other_storage_errors_still_wrap_generically() {
        let err = ScanError::from_storage(StorageError::SeekerAdvance("disk gone".into()));
        assert!(matches!(err, ScanError::Storage(StorageError::SeekerAdvance(_))));
    }
}

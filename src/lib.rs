//! streamscan — index-scan planning and execution core for stream-shaped
//! time-series data (spans, logs, events).
//!
//! This crate owns plan analysis, k-way merge, and projection. It does not
//! own schema registries, block storage, or wire encoding — those live
//! behind the `Schema` and `ExecutionContext` collaborator traits (see
//! `schema` and `context`), implemented by the embedding storage layer
//! (spec §1).
//!
//! Entry points: build an `UnresolvedPlan` with [`plan::index_scan`] or
//! [`plan::global_index_scan`], analyze it with [`plan::analyzer::analyze`]
//! against a `Schema` implementation, then drive it with [`plan::Plan::execute`]
//! against an `ExecutionContext` implementation.

pub mod context;
pub mod entity;
pub mod error;
pub mod expr;
pub mod merge;
pub mod obs;
pub mod path;
pub mod plan;
pub mod projection;
pub mod schema;
pub mod series;
pub mod value;

pub use context::{Direction, ExecutionContext, OrderBy, ScanItem, SeekerBuilder, Shard, StorageCondition, TimeRange};
pub use error::{ScanError, ScanResult, StorageError};
pub use plan::{global_index_scan, index_scan, GlobalIndexScan, LocalIndexScan, Plan, PlanType, ScanLimits, StreamMetadata, UnresolvedPlan};
pub use projection::{Element, Tag, TagFamily};
pub use schema::{IndexLocation, IndexRule, ProjectedSchema, RuleId, Schema};

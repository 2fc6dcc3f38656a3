//! Module: schema
//! Responsibility: the `Schema` collaborator contract, `IndexRule`, and `IndexLocation`.
//! Does not own: schema registry storage or binding resolution internals — external (spec §1).
//! Boundary: consumed by `expr::resolve_condition` and `plan::analyzer`.

use crate::{error::ScanError, expr::FieldRef};

///
/// RuleId
///
/// Interned handle for an `IndexRule`: an arena index, not a structural key
/// (spec §9 — "Map keyed by index-rule identity"). Two `IndexRule`s with the
/// same `RuleId` are the same rule; two rules with coincidentally identical
/// names/fields but different ids are distinct.
///
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RuleId(pub usize);

///
/// IndexLocation
///
/// Where an index rule is evaluated: inside one series' block scan, or as a
/// cross-series inverted lookup (spec Glossary).
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexLocation {
    SeriesLocal,
    Global,
}

///
/// IndexRule
///
/// Schema entity describing one index (spec §3). Identity is the `RuleId`,
/// not the name/tags/location — two `IndexRule` values with the same id are
/// equal even if constructed independently, and the converse holds too.
///
#[derive(Clone, Debug)]
pub struct IndexRule {
    pub id: RuleId,
    pub name: String,
    pub location: IndexLocation,
    pub tags: Vec<String>,
}

impl IndexRule {
    #[must_use]
    pub fn covers(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl PartialEq for IndexRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IndexRule {}

///
/// ProjectedSchema
///
/// The narrowed view `Schema::proj` returns: the set of `FieldRef`s a plan
/// projects, in caller-specified order (spec §4.8, §4.9 — "schema view
/// deep-equal" is one of the plan-equality fields).
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectedSchema {
    pub refs: Vec<FieldRef>,
}

impl ProjectedSchema {
    #[must_use]
    pub const fn new(refs: Vec<FieldRef>) -> Self {
        Self { refs }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

///
/// Schema
///
/// External collaborator (spec §1, §6): schema registry and index-rule
/// binding resolution live outside this core. The core only needs these
/// three operations.
///
pub trait Schema {
    /// Bind a raw tag name to a `FieldRef`, or `None` if unknown.
    fn resolve_field(&self, tag: &str) -> Option<FieldRef>;

    /// `IndexDefined(tag) → (bool, IndexRule)` (spec §6): `None` means no
    /// index covers this field; `Some(rule)` carries the covering rule.
    fn index_defined(&self, field: &FieldRef) -> Option<IndexRule>;

    /// `CreateRef(projection…) → [[FieldRef]]` (spec §6): turn caller-given
    /// `(family, tag)` pairs into bound `FieldRef`s. Fails with
    /// `ScanError::SchemaResolution` if a pair names a family/tag the schema
    /// doesn't recognize — distinct from `IndexNotDefined`, which is about
    /// index coverage on an otherwise-valid tag, not existence.
    fn create_ref(&self, projection: &[(String, String)]) -> Result<Vec<FieldRef>, ScanError>;

    /// `Proj(refs…) → Schema` (spec §6): narrow to a projected view.
    fn proj(&self, refs: &[FieldRef]) -> ProjectedSchema {
        ProjectedSchema::new(refs.to_vec())
    }
}

//! Module: expr
//! Responsibility: typed predicate AST and the resolve step that binds tag references.
//! Does not own: index classification (local vs global) — that is the analyzer's job.
//! Boundary: unresolved conditions arrive from the caller; resolved predicates feed the analyzer.

use crate::{error::ScanError, value::Literal};

///
/// CompareOp
///
/// Comparison operators a binary predicate may use (spec §3). Marked
/// `#[non_exhaustive]` since the spec calls the set "extensible".
///
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
}

///
/// FieldRef
///
/// A bound reference to a tag after schema resolution — the tag family it
/// lives in, and its name within that family (spec §4.8's "tag-family → tag"
/// 2-D ref shape).
///
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    pub family: String,
    pub tag: String,
}

impl FieldRef {
    #[must_use]
    pub fn new(family: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            tag: tag.into(),
        }
    }
}

///
/// UnresolvedCondition
///
/// A binary predicate as the caller states it: a raw tag name, not yet bound
/// against a schema. Lives on the `UnresolvedPlan` (spec §4.3).
///
#[derive(Clone, Debug, PartialEq)]
pub struct UnresolvedCondition {
    pub tag: String,
    pub op: CompareOp,
    pub value: Literal,
}

impl UnresolvedCondition {
    #[must_use]
    pub fn new(tag: impl Into<String>, op: CompareOp, value: Literal) -> Self {
        Self {
            tag: tag.into(),
            op,
            value,
        }
    }
}

///
/// BinaryPredicate
///
/// `FieldRef op Literal` (spec §3) — the only predicate shape that reaches
/// the scan core. Compound boolean trees are expected to have been
/// flattened upstream into per-rule conjunctions before analysis (spec
/// §4.5); this core never builds an And/Or/Not tree.
///
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryPredicate {
    pub field: FieldRef,
    pub op: CompareOp,
    pub value: Literal,
}

/// Resolve one raw condition against a tag-resolution function supplied by
/// the schema (spec §4.3 Step 1). Returns `ScanError::SchemaResolution` if
/// the tag cannot be bound — distinct from `IndexNotDefined`, which is a
/// later classification failure (spec §4.3 Step 2) for tags that resolve
/// fine but have no index.
pub fn resolve_condition(
    resolve_field: impl FnOnce(&str) -> Option<FieldRef>,
    condition: UnresolvedCondition,
) -> Result<BinaryPredicate, ScanError> {
    let field = resolve_field(&condition.tag).ok_or_else(|| {
        ScanError::SchemaResolution(format!("cannot bind tag {:?} against schema", condition.tag))
    })?;

    Ok(BinaryPredicate {
        field,
        op: condition.op,
        value: condition.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_condition_binds_known_tag() {
        let condition = UnresolvedCondition::new("http.status", CompareOp::Eq, Literal::Text("500".into()));
        let resolved = resolve_condition(
            |tag| (tag == "http.status").then(|| FieldRef::new("http", "status")),
            condition,
        )
        .unwrap();
        assert_eq!(resolved.field, FieldRef::new("http", "status"));
    }

    #[test]
    fn resolve_condition_fails_on_unknown_tag() {
        let condition = UnresolvedCondition::new("xyz", CompareOp::Eq, Literal::Text("v".into()));
        let err = resolve_condition(|_| None, condition).unwrap_err();
        assert!(matches!(err, ScanError::SchemaResolution(_)));
    }
}

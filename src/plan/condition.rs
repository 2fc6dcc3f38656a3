//! Module: plan::condition
//! Responsibility: `ConditionMap` — per-rule grouping of series-local predicates.
//! Does not own: classification of local vs global — `plan::analyzer` does that.
//! Boundary: built by `plan::analyzer`; consumed by `plan::local` to configure seeker filters.

use crate::{
    context::StorageCondition,
    expr::BinaryPredicate,
    schema::IndexRule,
};

///
/// ConditionMap
///
/// `IndexRule → ordered sequence of Expr` (spec §3), keyed by rule identity
/// rather than structural equality (spec §9 — "Map keyed by index-rule
/// identity"). Implemented as an insertion-ordered `Vec` rather than a hash
/// map: the number of distinct rules on one plan is small, and insertion
/// order keeps `Plan::to_plan_string` deterministic (spec §4.9).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConditionMap {
    entries: Vec<(IndexRule, Vec<BinaryPredicate>)>,
}

impl ConditionMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `predicate` under `rule` (spec §4.3 Step 2), creating the entry
    /// on first use. A second predicate pushed under a rule with the same
    /// `RuleId` lands in the existing entry rather than a new one.
    pub fn push(&mut self, rule: IndexRule, predicate: BinaryPredicate) {
        if let Some((_, predicates)) = self.entries.iter_mut().find(|(r, _)| r.id == rule.id) {
            predicates.push(predicate);
            return;
        }
        self.entries.push((rule, vec![predicate]));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexRule, &[BinaryPredicate])> {
        self.entries
            .iter()
            .map(|(rule, predicates)| (rule, predicates.as_slice()))
    }

    /// Flatten one rule's predicates into per-tag storage conditions (spec
    /// §4.5): predicates on the same tag under the same rule are
    /// conjunctive, so each simply appears in the output list — storage is
    /// expected to AND entries that share a tag.
    #[must_use]
    pub fn storage_conditions(predicates: &[BinaryPredicate]) -> Vec<StorageCondition> {
        predicates
            .iter()
            .map(|predicate| StorageCondition {
                tag: predicate.field.tag.clone(),
                op: predicate.op,
                value_bytes: predicate.value.to_bytes(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::CompareOp,
        schema::{IndexLocation, RuleId},
        value::Literal,
    };

    fn rule(id: usize, name: &str, tags: &[&str]) -> IndexRule {
        IndexRule {
            id: RuleId(id),
            name: name.into(),
            location: IndexLocation::SeriesLocal,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn predicate(family: &str, tag: &str) -> BinaryPredicate {
        BinaryPredicate {
            field: crate::expr::FieldRef::new(family, tag),
            op: CompareOp::Eq,
            value: Literal::Text("v".into()),
        }
    }

    #[test]
    fn two_predicates_on_same_rule_share_one_entry() {
        let rule = rule(1, "r1", &["a", "b"]);
        let mut map = ConditionMap::new();
        map.push(rule.clone(), predicate("f", "a"));
        map.push(rule, predicate("f", "b"));

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.len(), 2);
    }

    #[test]
    fn predicates_on_distinct_rules_land_in_distinct_entries() {
        let mut map = ConditionMap::new();
        map.push(rule(1, "r1", &["a"]), predicate("f", "a"));
        map.push(rule(2, "r2", &["b"]), predicate("f", "b"));

        assert_eq!(map.iter().count(), 2);
    }

    #[test]
    fn storage_conditions_carries_tag_op_and_canonical_bytes() {
        let predicates = vec![predicate("f", "a")];
        let conditions = ConditionMap::storage_conditions(&predicates);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].tag, "a");
        assert_eq!(conditions[0].value_bytes, Literal::Text("v".into()).to_bytes());
    }
}

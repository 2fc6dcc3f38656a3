//! Module: projection
//! Responsibility: materialize selected tag families and element id into an output `Element`.
//! Does not own: tag-family value materialization details — opaque helper (spec §1).
//! Boundary: called once per merged item by `plan::local`/`plan::global`.

use crate::{
    context::{ExecutionContext, ScanItem},
    error::ScanError,
    schema::ProjectedSchema,
};
use serde::{Deserialize, Serialize};

///
/// Tag
///
/// One typed key/value attached to an element (spec Glossary).
///
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

///
/// TagFamily
///
/// A group of tags sharing storage locality (spec Glossary).
///
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TagFamily {
    pub name: String,
    pub tags: Vec<Tag>,
}

///
/// Element
///
/// The wire-visible output shape (spec §6): `elementId`, nanosecond
/// `timestamp`, and `tagFamilies`, in the order the merge emits items.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(with = "serde_bytes")]
    pub element_id: Vec<u8>,
    pub timestamp_ns: i64,
    pub tag_families: Vec<TagFamily>,
}

/// Project one raw item into an `Element` (spec §4.8). Projection is
/// resolved here, not delegated unconditionally to the execution context,
/// so that empty `refs` always yields an empty `tag_families` list (spec §8
/// invariant 6) regardless of what a particular `ExecutionContext`
/// implementation would otherwise do.
pub fn project<I: ScanItem>(
    ctx: &dyn ExecutionContext<I>,
    item: &I,
    refs: &ProjectedSchema,
) -> Result<Element, ScanError> {
    let element_id = ctx.parse_element_id(item)?;
    let tag_families = if refs.is_empty() {
        Vec::new()
    } else {
        ctx.project_item(item, refs)?
    };

    Ok(Element {
        element_id,
        timestamp_ns: item.timestamp_ns(),
        tag_families,
    })
}

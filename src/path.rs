//! Module: path
//! Responsibility: derive prefix/mask/template key templates from an `Entity` for series lookup.
//! Does not own: the KV scan/get itself — that is `series::directory`'s job.
//! Boundary: built once per lookup from an `Entity`; consumed by `SeriesDirectory::list`.

use crate::entity::{Entity, Entry};
use sha2::{Digest, Sha256};

/// Per-entry hash width, in bytes (spec §3: "8 × |entity|").
const ENTRY_WIDTH: usize = 8;

/// Stable 64-bit hash of one entry's bytes, truncated from a SHA-256 digest
/// the same way `icydb-core`'s `db::hash` module truncates its canonical
/// value-hash digest to a `StableHash` (leading 8 bytes, big-endian).
#[must_use]
fn hash_entry_bytes(bytes: &[u8]) -> [u8; ENTRY_WIDTH] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; ENTRY_WIDTH];
    out.copy_from_slice(&digest[..ENTRY_WIDTH]);
    out
}

///
/// Path
///
/// Derived from an [`Entity`]: `template` (per-entry hash, zeros for `Any`),
/// `mask` (all-ones per concrete entry, zeros for `Any`), and `prefix` (the
/// longest all-concrete leading slice of `template`). Invariant (spec §3):
/// `(key & mask) == template` iff `key` matches the path.
///
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Path {
    pub template: Vec<u8>,
    pub mask: Vec<u8>,
    pub prefix: Vec<u8>,
    pub is_full: bool,
}

impl Path {
    /// Build a path from an entity (spec §4.1): traverse entries left to
    /// right, appending 8 bytes of template/mask per entry; the prefix stops
    /// at the first `Any`.
    #[must_use]
    pub fn new(entity: &Entity) -> Self {
        let mut template = Vec::with_capacity(entity.len() * ENTRY_WIDTH);
        let mut mask = Vec::with_capacity(entity.len() * ENTRY_WIDTH);
        let mut prefix_len = None;

        for (i, entry) in entity.entries().iter().enumerate() {
            match entry {
                Entry::Concrete(bytes) => {
                    template.extend_from_slice(&hash_entry_bytes(bytes));
                    mask.extend_from_slice(&[0xFF; ENTRY_WIDTH]);
                }
                Entry::Any => {
                    template.extend_from_slice(&[0; ENTRY_WIDTH]);
                    mask.extend_from_slice(&[0; ENTRY_WIDTH]);
                    if prefix_len.is_none() {
                        prefix_len = Some(i * ENTRY_WIDTH);
                    }
                }
            }
        }

        let prefix_len = prefix_len.unwrap_or(template.len());
        let prefix = template[..prefix_len].to_vec();
        let is_full = prefix_len == template.len();

        Self {
            template,
            mask,
            prefix,
            is_full,
        }
    }

    /// True iff `key` matches this path under the mask/template test
    /// (spec §3 invariant). `key` must be the same length as `template`.
    #[must_use]
    pub fn matches(&self, key: &[u8]) -> bool {
        if key.len() != self.template.len() {
            return false;
        }
        key.iter()
            .zip(self.mask.iter())
            .zip(self.template.iter())
            .all(|((k, m), t)| (k & m) == *t)
    }
}

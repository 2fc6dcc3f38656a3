//! Module: entity
//! Responsibility: `Entry` and `Entity`, the raw identifying components of a series.
//! Does not own: key hashing for storage (see `series`) or mask/template derivation (see `path`).
//! Boundary: built by callers from tag values; consumed by `path` and `series::directory`.

use std::fmt;

/// One component of an entity identity. A byte string, or the sentinel
/// [`Entry::Any`] meaning "unconstrained at this position" (spec §3).
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum Entry {
    Concrete(Vec<u8>),
    Any,
}

impl Entry {
    #[must_use]
    pub fn concrete(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Concrete(bytes.into())
    }

    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Concrete(bytes) => Some(bytes),
            Self::Any => None,
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => write!(f, "{text:?}"),
                Err(_) => write!(f, "0x{}", hex_encode(bytes)),
            },
            Self::Any => write!(f, "*"),
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl<T: Into<Vec<u8>>> From<T> for Entry {
    fn from(bytes: T) -> Self {
        Self::concrete(bytes)
    }
}

///
/// Entity
///
/// An ordered sequence of [`Entry`] identifying a series. Equality is by
/// concatenation of per-entry hashes (spec §3) — implemented here as
/// structural equality over the entry bytes, which is equivalent as long as
/// the hash used downstream (see `series::directory`) is collision-free for
/// practical purposes (spec §9, "Entity hash collisions").
///
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Entity {
    entries: Vec<Entry>,
}

impl Entity {
    #[must_use]
    pub const fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff no entry is [`Entry::Any`] — a fully concrete entity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.iter().all(|e| !e.is_any())
    }
}

impl FromIterator<Entry> for Entity {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

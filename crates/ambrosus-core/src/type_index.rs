use std::collections::HashMap;

use crate::errors::IndexError;
use crate::event_data::SectionKind;

/// Per-entity index from section kind to the positions of its sections.
///
/// Built once when the owning entity is constructed. Positions inside a
/// bucket keep the order in which they were supplied.
#[derive(Debug, Clone)]
pub struct TypeIndex<P> {
    buckets: HashMap<SectionKind, Vec<P>>,
}

impl<P: Copy> TypeIndex<P> {
    /// Groups `entries` by kind.
    pub fn build(entries: impl IntoIterator<Item = (SectionKind, P)>) -> Self {
        let mut buckets: HashMap<SectionKind, Vec<P>> = HashMap::new();
        for (kind, position) in entries {
            buckets.entry(kind).or_default().push(position);
        }
        Self { buckets }
    }

    /// Whether at least one section of `kind` exists.
    pub fn contains(&self, kind: &SectionKind) -> bool {
        self.buckets.contains_key(kind)
    }

    /// Positions of every section of `kind`, in order.
    pub fn bucket(&self, kind: &SectionKind) -> &[P] {
        self.buckets.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Position of the `index`-th section of `kind`; negative indices count from the end.
    pub fn position(&self, kind: &SectionKind, index: isize) -> Result<P, IndexError> {
        let bucket = self.bucket(kind);
        resolve_index(index, bucket.len())
            .map(|i| bucket[i])
            .ok_or_else(|| IndexError::OutOfRange {
                kind: kind.to_string(),
                index,
                len: bucket.len(),
            })
    }

    /// Kinds present in the index, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = &SectionKind> {
        self.buckets.keys()
    }
}

/// Resolves a possibly negative index against a length.
///
/// `-1` is the last element and `-len` the first; anything that is still
/// outside `0..len` after adding `len` once is rejected.
pub fn resolve_index(index: isize, len: usize) -> Option<usize> {
    let effective = if index >= 0 {
        usize::try_from(index).ok()?
    } else {
        len.checked_sub(index.unsigned_abs())?
    };
    (effective < len).then_some(effective)
}

use std::fmt;

use ambrosus_canonical::{Address, HexDigest, HexSignature};

use crate::errors::{BuildError, IndexError};
use crate::event_data::{EventData, SectionKind, TypedSection};
use crate::shared::MetaData;
use crate::type_index::{resolve_index, TypeIndex};

/// Immutable event attached to an asset.
///
/// Data sections keep the order they were added in. The type index is built
/// once by [`EventBuilder::build`] and takes no part in equality.
#[derive(Debug, Clone)]
pub struct EventRecord {
    id: Option<String>,
    asset_id: String,
    created_by: Option<Address>,
    timestamp: Option<u64>,
    access_level: u32,
    data: Vec<EventData>,
    data_hash: Option<HexDigest>,
    signature: Option<HexSignature>,
    metadata: Option<MetaData>,
    index: TypeIndex<usize>,
}

impl EventRecord {
    /// Network-assigned event id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Asset this event is attached to.
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Creator address.
    pub fn created_by(&self) -> Option<&Address> {
        self.created_by.as_ref()
    }

    /// Unix timestamp in seconds.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Minimum access level required to read the data.
    pub fn access_level(&self) -> u32 {
        self.access_level
    }

    /// Data sections in insertion order.
    pub fn data(&self) -> &[EventData] {
        &self.data
    }

    /// Content hash over the data array, when known.
    pub fn data_hash(&self) -> Option<&HexDigest> {
        self.data_hash.as_ref()
    }

    /// Signature over the identity fields, when known.
    pub fn signature(&self) -> Option<&HexSignature> {
        self.signature.as_ref()
    }

    /// Bundle metadata set by the network.
    pub fn metadata(&self) -> Option<&MetaData> {
        self.metadata.as_ref()
    }

    /// Type index over the data sections.
    pub fn type_index(&self) -> &TypeIndex<usize> {
        &self.index
    }

    /// Every section of type `T`, in insertion order.
    pub fn sections_of<T: TypedSection>(&self) -> Vec<&T> {
        self.index
            .bucket(&T::kind())
            .iter()
            .filter_map(|&position| T::downcast(&self.data[position]))
            .collect()
    }

    /// First section of type `T`.
    pub fn first_of<T: TypedSection>(&self) -> Option<&T> {
        self.sections_of::<T>().first().copied()
    }

    /// Last section of type `T`.
    pub fn last_of<T: TypedSection>(&self) -> Option<&T> {
        self.sections_of::<T>().last().copied()
    }

    /// The `index`-th section of type `T`; negative indices count from the end.
    pub fn section_at<T: TypedSection>(&self, index: isize) -> Result<&T, IndexError> {
        let sections = self.sections_of::<T>();
        resolve_index(index, sections.len())
            .map(|i| sections[i])
            .ok_or_else(|| IndexError::OutOfRange {
                kind: T::kind().to_string(),
                index,
                len: sections.len(),
            })
    }

    /// Whether the event carries at least one section of type `T`.
    pub fn has_data_of<T: TypedSection>(&self) -> bool {
        !self.sections_of::<T>().is_empty()
    }

    /// Every section of `kind`, each with a link back to this event.
    pub fn sections_of_kind(&self, kind: &SectionKind) -> Vec<SectionRef<'_>> {
        self.index
            .bucket(kind)
            .iter()
            .map(|&position| SectionRef::new(self, position))
            .collect()
    }

    /// The `index`-th section of `kind`; negative indices count from the end.
    pub fn section_ref_at(
        &self,
        kind: &SectionKind,
        index: isize,
    ) -> Result<SectionRef<'_>, IndexError> {
        let position = self.index.position(kind, index)?;
        Ok(SectionRef::new(self, position))
    }

    /// All sections in insertion order, each with a link back to this event.
    pub fn section_refs(&self) -> impl Iterator<Item = SectionRef<'_>> {
        (0..self.data.len()).map(move |position| SectionRef::new(self, position))
    }
}

impl PartialEq for EventRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.asset_id == other.asset_id
            && self.created_by == other.created_by
            && self.timestamp == other.timestamp
            && self.access_level == other.access_level
            && self.data == other.data
            && self.data_hash == other.data_hash
            && self.signature == other.signature
            && self.metadata == other.metadata
    }
}

/// A data section viewed together with the event that owns it.
#[derive(Clone, Copy)]
pub struct SectionRef<'a> {
    event: &'a EventRecord,
    position: usize,
}

impl<'a> SectionRef<'a> {
    pub(crate) fn new(event: &'a EventRecord, position: usize) -> Self {
        Self { event, position }
    }

    /// The section itself.
    pub fn data(&self) -> &'a EventData {
        &self.event.data[self.position]
    }

    /// The event the section belongs to.
    pub fn parent(&self) -> &'a EventRecord {
        self.event
    }

    /// Position of the section inside its event's data array.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Borrows the section as `T` if it is of that type.
    pub fn downcast<T: TypedSection>(&self) -> Option<&'a T> {
        T::downcast(self.data())
    }
}

impl fmt::Debug for SectionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionRef")
            .field("event", &self.event.id)
            .field("position", &self.position)
            .field("data", self.data())
            .finish()
    }
}

/// Mutable staging area for an [`EventRecord`].
///
/// Fields are public so that an orchestration layer can inspect and complete
/// them before calling [`EventBuilder::build`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBuilder {
    /// Network-assigned event id.
    pub id: Option<String>,
    /// Asset the event belongs to; required.
    pub asset_id: Option<String>,
    /// Creator address.
    pub created_by: Option<Address>,
    /// Unix timestamp in seconds.
    pub timestamp: Option<u64>,
    /// Access level; `build` defaults it to 0.
    pub access_level: Option<u32>,
    /// Data sections in order.
    pub data: Vec<EventData>,
    /// Precomputed content hash.
    pub data_hash: Option<HexDigest>,
    /// Precomputed signature.
    pub signature: Option<HexSignature>,
    /// Network metadata.
    pub metadata: Option<MetaData>,
}

impl EventBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with every field of `event`.
    pub fn from_existing(event: &EventRecord) -> Self {
        Self {
            id: event.id.clone(),
            asset_id: Some(event.asset_id.clone()),
            created_by: event.created_by.clone(),
            timestamp: event.timestamp,
            access_level: Some(event.access_level),
            data: event.data.clone(),
            data_hash: event.data_hash.clone(),
            signature: event.signature.clone(),
            metadata: event.metadata.clone(),
        }
    }

    /// Sets the event id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the asset id.
    pub fn asset_id(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }

    /// Sets the creator.
    pub fn created_by(mut self, address: impl Into<Address>) -> Self {
        self.created_by = Some(address.into());
        self
    }

    /// Sets the timestamp.
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the access level.
    pub fn access_level(mut self, access_level: u32) -> Self {
        self.access_level = Some(access_level);
        self
    }

    /// Appends one data section.
    pub fn add_data(mut self, section: impl Into<EventData>) -> Self {
        self.data.push(section.into());
        self
    }

    /// Appends several data sections.
    pub fn add_all_data(mut self, sections: impl IntoIterator<Item = EventData>) -> Self {
        self.data.extend(sections);
        self
    }

    /// Sets a precomputed content hash.
    pub fn data_hash(mut self, data_hash: impl Into<HexDigest>) -> Self {
        self.data_hash = Some(data_hash.into());
        self
    }

    /// Sets a precomputed signature.
    pub fn signature(mut self, signature: impl Into<HexSignature>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Sets network metadata.
    pub fn metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validates mandatory fields and freezes the event.
    pub fn build(self) -> Result<EventRecord, BuildError> {
        let asset_id = self.asset_id.ok_or(BuildError::MissingAssetId)?;
        let index = TypeIndex::build(
            self.data
                .iter()
                .enumerate()
                .map(|(position, section)| (section.kind(), position)),
        );

        Ok(EventRecord {
            id: self.id,
            asset_id,
            created_by: self.created_by,
            timestamp: self.timestamp,
            access_level: self.access_level.unwrap_or(0),
            data: self.data,
            data_hash: self.data_hash,
            signature: self.signature,
            metadata: self.metadata,
            index,
        })
    }
}

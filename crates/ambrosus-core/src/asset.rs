use std::collections::HashSet;

use ambrosus_canonical::{Address, HexSignature};

use crate::errors::IndexError;
use crate::event::{EventRecord, SectionRef};
use crate::event_data::{SectionKind, TypedSection};
use crate::shared::MetaData;
use crate::type_index::{resolve_index, TypeIndex};

/// Location of a section inside an asset: event position, then section position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionAddr {
    /// Position of the event in [`AssetRecord::events`].
    pub event: usize,
    /// Position of the section in that event's data.
    pub section: usize,
}

/// Immutable asset with its attached events.
///
/// Events are sorted by timestamp, newest first, when the asset is built;
/// events with equal timestamps keep their relative order. The section index
/// spans every event in that order.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    id: Option<String>,
    created_by: Option<Address>,
    timestamp: Option<u64>,
    sequence_number: Option<u32>,
    signature: Option<HexSignature>,
    events: Vec<EventRecord>,
    metadata: Option<MetaData>,
    index: TypeIndex<SectionAddr>,
}

impl AssetRecord {
    /// Network-assigned asset id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Creator address.
    pub fn created_by(&self) -> Option<&Address> {
        self.created_by.as_ref()
    }

    /// Unix timestamp in seconds.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Session sequence number used at creation.
    pub fn sequence_number(&self) -> Option<u32> {
        self.sequence_number
    }

    /// Signature over the identity fields, when known.
    pub fn signature(&self) -> Option<&HexSignature> {
        self.signature.as_ref()
    }

    /// Events, newest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Bundle metadata set by the network.
    pub fn metadata(&self) -> Option<&MetaData> {
        self.metadata.as_ref()
    }

    /// Type index over every section of every event.
    pub fn type_index(&self) -> &TypeIndex<SectionAddr> {
        &self.index
    }

    fn section_ref(&self, addr: SectionAddr) -> SectionRef<'_> {
        SectionRef::new(&self.events[addr.event], addr.section)
    }

    /// Every section of `kind` across all events, each linked to its event.
    pub fn sections_of_kind(&self, kind: &SectionKind) -> Vec<SectionRef<'_>> {
        self.index
            .bucket(kind)
            .iter()
            .map(|&addr| self.section_ref(addr))
            .collect()
    }

    /// The `index`-th section of `kind` across all events.
    pub fn section_ref_at(
        &self,
        kind: &SectionKind,
        index: isize,
    ) -> Result<SectionRef<'_>, IndexError> {
        let addr = self.index.position(kind, index)?;
        Ok(self.section_ref(addr))
    }

    /// Every section of type `T`, newest event first.
    pub fn sections_of<T: TypedSection>(&self) -> Vec<&T> {
        self.sections_of_kind(&T::kind())
            .into_iter()
            .filter_map(|section| section.downcast::<T>())
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

    /// Whether any event carries a section of type `T`.
    pub fn has_data_of<T: TypedSection>(&self) -> bool {
        !self.sections_of::<T>().is_empty()
    }

    /// Distinct events owning at least one section of type `T`, newest first.
    pub fn events_containing<T: TypedSection>(&self) -> Vec<&EventRecord> {
        let mut seen = HashSet::new();
        self.index
            .bucket(&T::kind())
            .iter()
            .filter(|addr| T::downcast(&self.events[addr.event].data()[addr.section]).is_some())
            .filter(|addr| seen.insert(addr.event))
            .map(|addr| &self.events[addr.event])
            .collect()
    }
}

impl PartialEq for AssetRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.created_by == other.created_by
            && self.timestamp == other.timestamp
            && self.sequence_number == other.sequence_number
            && self.signature == other.signature
            && self.events == other.events
            && self.metadata == other.metadata
    }
}

/// Mutable staging area for an [`AssetRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetBuilder {
    /// Network-assigned asset id.
    pub id: Option<String>,
    /// Creator address.
    pub created_by: Option<Address>,
    /// Unix timestamp in seconds.
    pub timestamp: Option<u64>,
    /// Session sequence number.
    pub sequence_number: Option<u32>,
    /// Precomputed signature.
    pub signature: Option<HexSignature>,
    /// Attached events, in any order.
    pub events: Vec<EventRecord>,
    /// Network metadata.
    pub metadata: Option<MetaData>,
}

impl AssetBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with every field of `asset`.
    pub fn from_existing(asset: &AssetRecord) -> Self {
        Self {
            id: asset.id.clone(),
            created_by: asset.created_by.clone(),
            timestamp: asset.timestamp,
            sequence_number: asset.sequence_number,
            signature: asset.signature.clone(),
            events: asset.events.clone(),
            metadata: asset.metadata.clone(),
        }
    }

    /// Sets the asset id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
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

    /// Sets the sequence number.
    pub fn sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Sets a precomputed signature.
    pub fn signature(mut self, signature: impl Into<HexSignature>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Attaches one event.
    pub fn add_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    /// Attaches several events.
    pub fn add_all_events(mut self, events: impl IntoIterator<Item = EventRecord>) -> Self {
        self.events.extend(events);
        self
    }

    /// Sets network metadata.
    pub fn metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sorts the events and freezes the asset.
    pub fn build(self) -> AssetRecord {
        let mut events = self.events;
        // Stable: equal timestamps keep insertion order.
        events.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        let index = TypeIndex::build(events.iter().enumerate().flat_map(|(event, record)| {
            record
                .data()
                .iter()
                .enumerate()
                .map(move |(section, data)| (data.kind(), SectionAddr { event, section }))
        }));

        AssetRecord {
            id: self.id,
            created_by: self.created_by,
            timestamp: self.timestamp,
            sequence_number: self.sequence_number,
            signature: self.signature,
            events,
            metadata: self.metadata,
            index,
        }
    }
}

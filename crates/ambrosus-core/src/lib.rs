//! Record model for the Ambrosus network: assets, events and their typed data sections.
//!
//! This crate provides:
//! - Immutable [`AssetRecord`] and [`EventRecord`] entities built from mutable builders
//! - Event data sections ([`EventData`]) with a pluggable [`SectionRegistry`]
//! - Per-entity [`TypeIndex`] for typed and positional section retrieval
//! - Canonical wire (de)serialization, data hashing and signature checks ([`wire`])
//! - Self-signed [`GroupToken`]s
//!
//! Core invariants:
//! - Entities never change after `build()`; derive a new builder with `from_existing`
//! - An asset's events are ordered newest first, ties keeping insertion order
//! - A present signature or data hash is never recomputed
//! - Decoding never panics; `deserialize_*` returns `None` on malformed input
//!
#![deny(missing_docs)]

/// Immutable assets and their builder.
pub mod asset;
/// Error types for core operations.
pub mod errors;
/// Immutable events, their builder and section views.
pub mod event;
/// Typed event data sections.
pub mod event_data;
/// Self-signed group access tokens.
pub mod group_token;
/// Section decoders keyed by type tag.
pub mod registry;
/// Shared types used by assets and events.
pub mod shared;
/// Type index over data sections.
pub mod type_index;
pub mod wire;

pub use asset::{AssetBuilder, AssetRecord, SectionAddr};
pub use errors::{BuildError, IndexError, SectionDecodeError, WireError};
pub use event::{EventBuilder, EventRecord, SectionRef};
pub use event_data::{
    CustomSection, EventData, Location, Message, RawJson, SectionKind, Transport, TypedSection,
    LOCATION_TYPE, MESSAGE_TYPE, TRANSPORT_TYPE,
};
pub use group_token::GroupToken;
pub use registry::{SectionCodec, SectionRegistry};
pub use shared::MetaData;
pub use type_index::{resolve_index, TypeIndex};
pub use wire::{
    asset_id_data, compute_data_hash, compute_data_hash_of_value, compute_signature,
    deserialize_asset, deserialize_event, event_id_data, serialize_asset, serialize_event,
    try_deserialize_asset, try_deserialize_event, verify_asset_signature, verify_data_hash,
    verify_event_signature, verify_wire_data_hash, verify_wire_signature,
};

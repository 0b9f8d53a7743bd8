//! Canonical wire encoding of assets and events.
//!
//! ```text
//! {
//!   "<assetId|eventId>"?: "...",
//!   "content": {
//!     "idData": { identity fields, "dataHash"? },
//!     "data"?: [ sections ],
//!     "signature": "0x..."
//!   },
//!   "metadata"?: { "bundleId": "...", "entityUploadTimestamp": N }
//! }
//! ```
//!
//! The signature covers the canonical text of `idData` only. An event's
//! `dataHash` covers the canonical text of its `data` array. Bodies produced
//! here are canonical as a whole, so they are byte-stable across runs.

use ambrosus_canonical::{
    canonical_string, canonicalize, element_with_path, hash_hex, verify, Address, CryptoError,
    HexDigest, HexSignature, Signer,
};
use serde_json::{json, Map, Value};

use crate::asset::{AssetBuilder, AssetRecord};
use crate::errors::WireError;
use crate::event::{EventBuilder, EventRecord};
use crate::event_data::EventData;
use crate::registry::SectionRegistry;
use crate::shared::MetaData;

const ACCESS_LEVEL: &str = "accessLevel";
const ASSET_ID: &str = "assetId";
const CONTENT: &str = "content";
const CREATED_BY: &str = "createdBy";
const DATA: &str = "data";
const DATA_HASH: &str = "dataHash";
const EVENT_ID: &str = "eventId";
const ID_DATA: &str = "idData";
const META_DATA: &str = "metadata";
const SEQUENCE_NUMBER: &str = "sequenceNumber";
const SIGNATURE: &str = "signature";
const TIMESTAMP: &str = "timestamp";

/// Content hash of a list of sections.
pub fn compute_data_hash(data: &[EventData]) -> HexDigest {
    compute_data_hash_of_value(&data_array(data))
}

/// Content hash of a raw `data` array as received on the wire.
pub fn compute_data_hash_of_value(data: &Value) -> HexDigest {
    hash_hex(&canonical_string(data))
}

/// Signs the canonical text of `id_data`.
pub fn compute_signature(id_data: &Value, signer: &Signer) -> Result<HexSignature, CryptoError> {
    signer.sign(&canonical_string(id_data))
}

/// Canonical `idData` of an asset: `createdBy`, `sequenceNumber`, `timestamp`.
pub fn asset_id_data(asset: &AssetRecord) -> Result<Value, WireError> {
    let created_by = asset.created_by().ok_or(WireError::MissingField(CREATED_BY))?;
    let sequence_number = asset
        .sequence_number()
        .ok_or(WireError::MissingField(SEQUENCE_NUMBER))?;
    let timestamp = asset.timestamp().ok_or(WireError::MissingField(TIMESTAMP))?;

    Ok(canonicalize(&json!({
        CREATED_BY: created_by,
        SEQUENCE_NUMBER: sequence_number,
        TIMESTAMP: timestamp,
    })))
}

/// Canonical `idData` of an event, computing `dataHash` when the event has none.
pub fn event_id_data(event: &EventRecord) -> Result<Value, WireError> {
    let created_by = event.created_by().ok_or(WireError::MissingField(CREATED_BY))?;
    let timestamp = event.timestamp().ok_or(WireError::MissingField(TIMESTAMP))?;
    let data_hash = match event.data_hash() {
        Some(hash) => hash.clone(),
        None => {
            let hash = compute_data_hash(event.data());
            tracing::debug!(data_hash = %hash, "computed missing event data hash");
            hash
        }
    };

    Ok(canonicalize(&json!({
        ACCESS_LEVEL: event.access_level(),
        ASSET_ID: event.asset_id(),
        CREATED_BY: created_by,
        DATA_HASH: data_hash,
        TIMESTAMP: timestamp,
    })))
}

/// Wire body of an asset.
///
/// `signer` is only used when the asset carries no signature yet.
pub fn serialize_asset(asset: &AssetRecord, signer: Option<&Signer>) -> Result<Value, WireError> {
    let id_data = asset_id_data(asset)?;
    let signature = existing_or_new_signature(asset.signature(), &id_data, signer)?;

    let mut body = Map::new();
    if let Some(id) = asset.id() {
        body.insert(ASSET_ID.into(), Value::from(id));
    }
    body.insert(
        CONTENT.into(),
        json!({ ID_DATA: id_data, SIGNATURE: signature }),
    );
    insert_metadata(&mut body, asset.metadata())?;
    Ok(canonicalize(&Value::Object(body)))
}

/// Wire body of an event.
///
/// `signer` is only used when the event carries no signature yet.
pub fn serialize_event(event: &EventRecord, signer: Option<&Signer>) -> Result<Value, WireError> {
    let id_data = event_id_data(event)?;
    let signature = existing_or_new_signature(event.signature(), &id_data, signer)?;

    let mut body = Map::new();
    if let Some(id) = event.id() {
        body.insert(EVENT_ID.into(), Value::from(id));
    }
    body.insert(
        CONTENT.into(),
        json!({
            ID_DATA: id_data,
            DATA: data_array(event.data()),
            SIGNATURE: signature,
        }),
    );
    insert_metadata(&mut body, event.metadata())?;
    Ok(canonicalize(&Value::Object(body)))
}

/// Decodes an asset body. Attached events are not part of the asset wire form.
pub fn try_deserialize_asset(body: &Value) -> Result<AssetRecord, WireError> {
    let body = body
        .as_object()
        .ok_or_else(|| WireError::invalid("body", "not a json object"))?;
    let content = object_field(body, CONTENT)?;
    let id_data = object_field(content, ID_DATA)?;

    let mut builder = AssetBuilder::new()
        .created_by(Address::new(required_str(id_data, CREATED_BY)?))
        .timestamp(required_u64(id_data, TIMESTAMP)?)
        .sequence_number(required_u32(id_data, SEQUENCE_NUMBER)?);
    builder.id = optional_str(body, ASSET_ID)?;
    builder.signature = optional_str(content, SIGNATURE)?.map(HexSignature::new);
    builder.metadata = optional_metadata(body)?;
    Ok(builder.build())
}

/// Decodes an event body, resolving sections through `registry`.
///
/// Sections that fail to decode are dropped with a warning; the rest of the
/// event is still returned.
pub fn try_deserialize_event(
    body: &Value,
    registry: &SectionRegistry,
) -> Result<EventRecord, WireError> {
    let body = body
        .as_object()
        .ok_or_else(|| WireError::invalid("body", "not a json object"))?;
    let content = object_field(body, CONTENT)?;
    let id_data = object_field(content, ID_DATA)?;

    let mut builder = EventBuilder::new()
        .asset_id(required_str(id_data, ASSET_ID)?)
        .created_by(Address::new(required_str(id_data, CREATED_BY)?))
        .timestamp(required_u64(id_data, TIMESTAMP)?)
        .access_level(required_u32(id_data, ACCESS_LEVEL)?)
        .add_all_data(registry.decode_array(content.get(DATA).unwrap_or(&Value::Null)));
    builder.id = optional_str(body, EVENT_ID)?;
    builder.data_hash = optional_str(id_data, DATA_HASH)?.map(HexDigest::new);
    builder.signature = optional_str(content, SIGNATURE)?.map(HexSignature::new);
    builder.metadata = optional_metadata(body)?;

    builder
        .build()
        .map_err(|_| WireError::MissingField(ASSET_ID))
}

/// Like [`try_deserialize_asset`], logging the failure and returning `None`.
pub fn deserialize_asset(body: &Value) -> Option<AssetRecord> {
    try_deserialize_asset(body)
        .map_err(|err| tracing::warn!(error = %err, "could not decode asset"))
        .ok()
}

/// Like [`try_deserialize_event`], logging the failure and returning `None`.
pub fn deserialize_event(body: &Value, registry: &SectionRegistry) -> Option<EventRecord> {
    try_deserialize_event(body, registry)
        .map_err(|err| tracing::warn!(error = %err, "could not decode event"))
        .ok()
}

/// Whether the asset's signature recovers to its creator. False when either is absent.
pub fn verify_asset_signature(asset: &AssetRecord) -> bool {
    match (asset_id_data(asset), asset.signature(), asset.created_by()) {
        (Ok(id_data), Some(signature), Some(created_by)) => verify(
            &canonical_string(&id_data),
            created_by.as_str(),
            signature.as_str(),
        ),
        _ => false,
    }
}

/// Whether the event's signature recovers to its creator. False when either is absent.
pub fn verify_event_signature(event: &EventRecord) -> bool {
    match (event_id_data(event), event.signature(), event.created_by()) {
        (Ok(id_data), Some(signature), Some(created_by)) => verify(
            &canonical_string(&id_data),
            created_by.as_str(),
            signature.as_str(),
        ),
        _ => false,
    }
}

/// Whether the event's stored `dataHash` matches its sections. False when absent.
pub fn verify_data_hash(event: &EventRecord) -> bool {
    event
        .data_hash()
        .is_some_and(|stored| *stored == compute_data_hash(event.data()))
}

/// Checks `content.signature` against `content.idData` of a raw asset or event body.
pub fn verify_wire_signature(body: &Value) -> bool {
    let id_data = element_with_path(body, "content|idData", '|');
    let created_by = element_with_path(body, "content|idData|createdBy", '|').and_then(Value::as_str);
    let signature = element_with_path(body, "content|signature", '|').and_then(Value::as_str);

    match (id_data, created_by, signature) {
        (Some(id_data), Some(created_by), Some(signature)) => {
            verify(&canonical_string(id_data), created_by, signature)
        }
        _ => false,
    }
}

/// Checks `content.idData.dataHash` against `content.data` of a raw event body.
pub fn verify_wire_data_hash(body: &Value) -> bool {
    let data = element_with_path(body, "content|data", '|');
    let stored = element_with_path(body, "content|idData|dataHash", '|').and_then(Value::as_str);

    match (data, stored) {
        (Some(data), Some(stored)) => compute_data_hash_of_value(data).as_str() == stored,
        _ => false,
    }
}

fn data_array(data: &[EventData]) -> Value {
    Value::Array(data.iter().map(EventData::to_json).collect())
}

fn existing_or_new_signature(
    existing: Option<&HexSignature>,
    id_data: &Value,
    signer: Option<&Signer>,
) -> Result<HexSignature, WireError> {
    match (existing, signer) {
        (Some(signature), _) => Ok(signature.clone()),
        (None, Some(signer)) => {
            let signature = compute_signature(id_data, signer)?;
            tracing::debug!(signer = %signer.address(), "computed missing signature");
            Ok(signature)
        }
        (None, None) => Err(WireError::MissingSigner),
    }
}

fn insert_metadata(body: &mut Map<String, Value>, metadata: Option<&MetaData>) -> Result<(), WireError> {
    if let Some(metadata) = metadata {
        body.insert(META_DATA.into(), serde_json::to_value(metadata)?);
    }
    Ok(())
}

fn object_field<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Map<String, Value>, WireError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(WireError::MissingField(field)),
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(WireError::invalid(field, "not a json object")),
    }
}

fn optional_str(object: &Map<String, Value>, field: &'static str) -> Result<Option<String>, WireError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(WireError::invalid(field, "not a string")),
    }
}

fn required_str(object: &Map<String, Value>, field: &'static str) -> Result<String, WireError> {
    optional_str(object, field)?.ok_or(WireError::MissingField(field))
}

fn required_u64(object: &Map<String, Value>, field: &'static str) -> Result<u64, WireError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(WireError::MissingField(field)),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| WireError::invalid(field, format!("{value} is not a non-negative integer"))),
    }
}

fn required_u32(object: &Map<String, Value>, field: &'static str) -> Result<u32, WireError> {
    let value = required_u64(object, field)?;
    u32::try_from(value).map_err(|_| WireError::invalid(field, format!("{value} does not fit in 32 bits")))
}

fn optional_metadata(body: &Map<String, Value>) -> Result<Option<MetaData>, WireError> {
    match body.get(META_DATA) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

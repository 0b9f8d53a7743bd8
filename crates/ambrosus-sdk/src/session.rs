use std::num::NonZeroU32;

use ambrosus_canonical::{Address, Signer};
use ambrosus_core::{
    deserialize_asset, deserialize_event, serialize_asset, serialize_event, verify_asset_signature,
    verify_data_hash, verify_event_signature, verify_wire_signature, AssetBuilder, AssetRecord,
    BuildError, EventBuilder, EventRecord, GroupToken, SectionRegistry,
};
use serde_json::Value;

use crate::config::SdkConfig;
use crate::errors::SdkError;
use crate::sequence::SequenceCounter;

/// Signing session bound to one account.
///
/// Completes builders with the session defaults, signs and serializes them
/// into request bodies, and parses and checks response bodies. Sending the
/// bodies is up to the caller. All methods take `&self`; an `Sdk` can be
/// shared between threads.
#[derive(Debug)]
pub struct Sdk {
    signer: Signer,
    registry: SectionRegistry,
    sequence: SequenceCounter,
    base_url: String,
    default_access_level: u32,
}

impl Sdk {
    /// Session using the built-in section registry.
    pub fn new(config: SdkConfig) -> Result<Self, SdkError> {
        Self::with_registry(config, SectionRegistry::new())
    }

    /// Session decoding event data through `registry`.
    pub fn with_registry(config: SdkConfig, registry: SectionRegistry) -> Result<Self, SdkError> {
        let signer = Signer::from_hex(&config.private_key)?;
        let bound = NonZeroU32::new(config.sequence_bound)
            .ok_or_else(|| SdkError::Config("sequence_bound must be at least 1".into()))?;

        tracing::info!(
            address = %signer.address(),
            base_url = %config.base_url,
            "sdk session ready"
        );
        Ok(Self {
            signer,
            registry,
            sequence: SequenceCounter::new(bound),
            base_url: config.base_url,
            default_access_level: config.default_access_level,
        })
    }

    /// Address derived from the session key.
    pub fn address(&self) -> &Address {
        self.signer.address()
    }

    /// Base URL from the configuration.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registry used to decode event data.
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Sequence counter of this session.
    pub fn sequence(&self) -> &SequenceCounter {
        &self.sequence
    }

    /// Fills creator, timestamp and sequence number where the builder has none.
    ///
    /// The sequence counter only advances when a number is actually assigned.
    pub fn complete_asset(&self, mut builder: AssetBuilder) -> AssetBuilder {
        if builder.created_by.is_none() {
            builder.created_by = Some(self.address().clone());
        }
        if builder.timestamp.is_none() {
            builder.timestamp = Some(unix_timestamp());
        }
        if builder.sequence_number.is_none() {
            builder.sequence_number = Some(self.sequence.next());
        }
        builder
    }

    /// Fills creator, timestamp and access level where the builder has none.
    ///
    /// Fails before touching anything when the asset id is missing.
    pub fn complete_event(&self, mut builder: EventBuilder) -> Result<EventBuilder, SdkError> {
        if builder.asset_id.is_none() {
            return Err(BuildError::MissingAssetId.into());
        }
        if builder.created_by.is_none() {
            builder.created_by = Some(self.address().clone());
        }
        if builder.timestamp.is_none() {
            builder.timestamp = Some(unix_timestamp());
        }
        if builder.access_level.is_none() {
            builder.access_level = Some(self.default_access_level);
        }
        Ok(builder)
    }

    /// Completes, builds and serializes an asset into a creation request body.
    pub fn prepare_asset(&self, builder: AssetBuilder) -> Result<Value, SdkError> {
        let asset = self.complete_asset(builder).build();
        self.serialize_asset(&asset)
    }

    /// Completes, builds and serializes an event into a creation request body.
    pub fn prepare_event(&self, builder: EventBuilder) -> Result<Value, SdkError> {
        let event = self.complete_event(builder)?.build()?;
        self.serialize_event(&event)
    }

    /// Serializes an asset, signing it with the session key if unsigned.
    pub fn serialize_asset(&self, asset: &AssetRecord) -> Result<Value, SdkError> {
        Ok(serialize_asset(asset, Some(&self.signer))?)
    }

    /// Serializes an event, signing it with the session key if unsigned.
    pub fn serialize_event(&self, event: &EventRecord) -> Result<Value, SdkError> {
        Ok(serialize_event(event, Some(&self.signer))?)
    }

    /// Parses an asset response body; `None` when it is not a valid asset.
    pub fn parse_asset(&self, body: &str) -> Option<AssetRecord> {
        parse_json(body).and_then(|value| deserialize_asset(&value))
    }

    /// Parses an event response body; `None` when it is not a valid event.
    pub fn parse_event(&self, body: &str) -> Option<EventRecord> {
        parse_json(body).and_then(|value| self.parse_event_value(&value))
    }

    /// Decodes an already parsed event body.
    pub fn parse_event_value(&self, body: &Value) -> Option<EventRecord> {
        deserialize_event(body, &self.registry)
    }

    /// Whether the asset's signature recovers to its creator.
    pub fn verify_asset(&self, asset: &AssetRecord) -> bool {
        verify_asset_signature(asset)
    }

    /// Whether the event's signature recovers to its creator and its data hash matches.
    pub fn verify_event(&self, event: &EventRecord) -> bool {
        verify_event_signature(event) && verify_data_hash(event)
    }

    /// Checks the signature of a raw asset or event body.
    pub fn verify_signature(&self, body: &Value) -> bool {
        verify_wire_signature(body)
    }

    /// Base64 group token signed by the session key, valid until `valid_until` (unix seconds).
    pub fn create_group_token(&self, valid_until: u64) -> Result<String, SdkError> {
        Ok(GroupToken::create(&self.signer, valid_until)?.encode())
    }
}

fn parse_json(body: &str) -> Option<Value> {
    serde_json::from_str(body)
        .map_err(|err| tracing::warn!(error = %err, "response body is not json"))
        .ok()
}

fn unix_timestamp() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::SectionDecodeError;
use crate::event_data::{
    CustomSection, EventData, Location, Message, RawJson, Transport, LOCATION_TYPE, MESSAGE_TYPE,
    TRANSPORT_TYPE,
};

/// Decoding strategy for one section type tag.
pub trait SectionCodec: Send + Sync {
    /// Decodes a section object whose `type` matched the registered tag.
    fn decode(&self, json: &Map<String, Value>) -> Result<EventData, SectionDecodeError>;
}

impl<F> SectionCodec for F
where
    F: Fn(&Map<String, Value>) -> Result<EventData, SectionDecodeError> + Send + Sync,
{
    fn decode(&self, json: &Map<String, Value>) -> Result<EventData, SectionDecodeError> {
        self(json)
    }
}

/// Maps section type tags to decoders.
///
/// Tags without a codec decode to [`EventData::Raw`]. The registry is cheap to
/// clone and immutable once handed to an SDK.
#[derive(Clone)]
pub struct SectionRegistry {
    codecs: HashMap<String, Arc<dyn SectionCodec>>,
}

impl SectionRegistry {
    /// Registry with the built-in location, transport and message codecs.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .register(LOCATION_TYPE, |json: &Map<String, Value>| {
                Location::from_json(json).map(EventData::Location)
            })
            .register(TRANSPORT_TYPE, |json: &Map<String, Value>| {
                Transport::from_json(json).map(EventData::Transport)
            })
            .register(MESSAGE_TYPE, |json: &Map<String, Value>| {
                Message::from_json(json).map(EventData::Message)
            });
        registry
    }

    /// Registry without any codec: every section decodes to [`EventData::Raw`].
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registers `codec` for `tag`, replacing any previous codec (built-ins included).
    pub fn register<C>(&mut self, tag: impl Into<String>, codec: C) -> &mut Self
    where
        C: SectionCodec + 'static,
    {
        self.codecs.insert(tag.into(), Arc::new(codec));
        self
    }

    /// Registers a serde-decodable user type under `tag`.
    pub fn register_custom<T>(&mut self, tag: impl Into<String>) -> &mut Self
    where
        T: CustomSection + DeserializeOwned,
    {
        self.register(tag, |json: &Map<String, Value>| -> Result<EventData, SectionDecodeError> {
            let section: T = serde_json::from_value(Value::Object(json.clone()))?;
            Ok(EventData::custom(section))
        })
    }

    /// Whether a codec exists for `tag`.
    pub fn is_registered(&self, tag: &str) -> bool {
        self.codecs.contains_key(tag)
    }

    /// Decodes one element of a `data` array.
    pub fn decode(&self, element: &Value) -> Result<EventData, SectionDecodeError> {
        let json = element.as_object().ok_or(SectionDecodeError::NotAnObject)?;
        let tag = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or(SectionDecodeError::MissingType)?;

        match self.codecs.get(tag) {
            Some(codec) => codec.decode(json),
            None => Ok(EventData::Raw(RawJson::new(json.clone()))),
        }
    }

    /// Decodes a `data` array, skipping elements that fail to decode.
    ///
    /// Anything other than an array yields an empty list.
    pub fn decode_array(&self, data: &Value) -> Vec<EventData> {
        let Some(elements) = data.as_array() else {
            if !data.is_null() {
                tracing::warn!("event data is not an array, ignoring it");
            }
            return Vec::new();
        };

        elements
            .iter()
            .enumerate()
            .filter_map(|(position, element)| match self.decode(element) {
                Ok(section) => Some(section),
                Err(err) => {
                    tracing::warn!(position, error = %err, "dropping event data element");
                    None
                }
            })
            .collect()
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.codecs.keys().collect();
        tags.sort();
        f.debug_struct("SectionRegistry").field("tags", &tags).finish()
    }
}

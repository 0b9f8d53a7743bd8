//! Typed sections carried in an event's `data` array.
//!
//! Every section is a JSON object whose `type` property selects its variant.
//! The three built-in types have dedicated structs; user types plug in through
//! [`CustomSection`]; anything unregistered is kept verbatim as [`RawJson`] so
//! that it re-serializes to the same canonical text it was decoded from.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use ambrosus_canonical::canonical_string;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::SectionDecodeError;

/// Type tag of [`Location`] sections.
pub const LOCATION_TYPE: &str = "ambrosus.asset.location";
/// Type tag of [`Transport`] sections.
pub const TRANSPORT_TYPE: &str = "ambrosus.event.transport";
/// Type tag of [`Message`] sections.
pub const MESSAGE_TYPE: &str = "ambrosus.event.message";

const TYPE_KEY: &str = "type";

/// Geographic location, encoded as a GeoJSON point.
///
/// On the wire the coordinates array holds `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Place name.
    pub name: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
}

impl Location {
    /// Creates a location section.
    pub fn new(
        latitude: f64,
        longitude: f64,
        name: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
            city: city.into(),
            country: country.into(),
        }
    }

    /// Wire form of the section.
    pub fn to_json(&self) -> Value {
        json!({
            "type": LOCATION_TYPE,
            "name": self.name,
            "city": self.city,
            "country": self.country,
            "location": {
                "geometry": {
                    "type": "Point",
                    "coordinates": [self.longitude, self.latitude],
                }
            }
        })
    }

    /// Decodes a location section; every property is required.
    pub fn from_json(json: &Map<String, Value>) -> Result<Self, SectionDecodeError> {
        let coordinates = json
            .get("location")
            .and_then(|v| v.get("geometry"))
            .and_then(|v| v.get("coordinates"))
            .and_then(Value::as_array)
            .ok_or(SectionDecodeError::MissingField("location.geometry.coordinates"))?;

        if coordinates.len() != 2 {
            return Err(SectionDecodeError::InvalidField {
                field: "coordinates",
                reason: format!("expected 2 elements, got {}", coordinates.len()),
            });
        }
        let coordinate = |i: usize| {
            coordinates[i]
                .as_f64()
                .ok_or_else(|| SectionDecodeError::InvalidField {
                    field: "coordinates",
                    reason: format!("element {i} is not a number"),
                })
        };

        Ok(Self {
            longitude: coordinate(0)?,
            latitude: coordinate(1)?,
            name: required_str(json, "name")?,
            city: required_str(json, "city")?,
            country: required_str(json, "country")?,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location event {}: latitude {:.6} longitude {:.6}",
            self.name, self.latitude, self.longitude
        )
    }
}

/// Transport status update. Absent properties are omitted from the wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    /// Shipment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Vehicle identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
}

impl Transport {
    /// Creates a transport section with all three properties set.
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        vehicle: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            status: Some(status.into()),
            vehicle: Some(vehicle.into()),
        }
    }

    /// Shipment name, or `""` when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Status, or `""` when absent.
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    /// Vehicle, or `""` when absent.
    pub fn vehicle(&self) -> &str {
        self.vehicle.as_deref().unwrap_or_default()
    }

    /// Wire form of the section.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(TYPE_KEY.into(), Value::from(TRANSPORT_TYPE));
        for (key, value) in [
            ("name", &self.name),
            ("status", &self.status),
            ("vehicle", &self.vehicle),
        ] {
            if let Some(value) = value {
                body.insert(key.into(), Value::from(value.as_str()));
            }
        }
        Value::Object(body)
    }

    /// Decodes a transport section; every property is optional.
    pub fn from_json(json: &Map<String, Value>) -> Result<Self, SectionDecodeError> {
        Ok(serde_json::from_value(Value::Object(json.clone()))?)
    }
}

/// Free-text message. The text travels under the `name` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
}

impl Message {
    /// Creates a message section.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Message text.
    pub fn message(&self) -> &str {
        &self.text
    }

    /// Wire form of the section.
    pub fn to_json(&self) -> Value {
        json!({ "type": MESSAGE_TYPE, "name": self.text })
    }

    /// Decodes a message section.
    pub fn from_json(json: &Map<String, Value>) -> Result<Self, SectionDecodeError> {
        Ok(Self::new(required_str(json, "name")?))
    }
}

/// Lossless passthrough for sections whose type has no registered codec.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJson(Map<String, Value>);

impl RawJson {
    /// Wraps a JSON object, `type` property included.
    pub fn new(json: Map<String, Value>) -> Self {
        Self(json)
    }

    /// The wrapped object.
    pub fn json(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Value of the `type` property, if it is a string.
    pub fn type_tag(&self) -> Option<&str> {
        self.0.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// Wire form of the section.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl fmt::Display for RawJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// A user-defined section type.
///
/// Implementors are registered with a [`crate::SectionRegistry`] under their
/// tag; [`EventData::downcast_custom`] recovers the concrete type.
pub trait CustomSection: fmt::Debug + Send + Sync + 'static {
    /// Value written to the `type` property.
    fn type_tag(&self) -> &str;
    /// Wire form, including the `type` property.
    fn to_json(&self) -> Value;
    /// Upcast used for downcasting back to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// One typed payload entry attached to an event.
#[derive(Debug, Clone)]
pub enum EventData {
    /// `ambrosus.asset.location`.
    Location(Location),
    /// `ambrosus.event.transport`.
    Transport(Transport),
    /// `ambrosus.event.message`.
    Message(Message),
    /// A registered user type.
    Custom(Arc<dyn CustomSection>),
    /// Any other object, kept verbatim.
    Raw(RawJson),
}

impl EventData {
    /// Wraps a user section.
    pub fn custom<T: CustomSection>(section: T) -> Self {
        EventData::Custom(Arc::new(section))
    }

    /// Type tag carried on the wire, if any.
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            EventData::Location(_) => Some(LOCATION_TYPE),
            EventData::Transport(_) => Some(TRANSPORT_TYPE),
            EventData::Message(_) => Some(MESSAGE_TYPE),
            EventData::Custom(section) => Some(section.type_tag()),
            EventData::Raw(raw) => raw.type_tag(),
        }
    }

    /// Index bucket this section belongs to.
    pub fn kind(&self) -> SectionKind {
        match self {
            EventData::Location(_) => SectionKind::Location,
            EventData::Transport(_) => SectionKind::Transport,
            EventData::Message(_) => SectionKind::Message,
            EventData::Custom(section) => SectionKind::Custom(section.type_tag().to_string()),
            EventData::Raw(_) => SectionKind::Raw,
        }
    }

    /// Wire form of the section (not yet canonicalized).
    pub fn to_json(&self) -> Value {
        match self {
            EventData::Location(section) => section.to_json(),
            EventData::Transport(section) => section.to_json(),
            EventData::Message(section) => section.to_json(),
            EventData::Custom(section) => section.to_json(),
            EventData::Raw(section) => section.to_json(),
        }
    }

    /// Borrows the concrete user type behind a [`EventData::Custom`] section.
    pub fn downcast_custom<T: CustomSection>(&self) -> Option<&T> {
        match self {
            EventData::Custom(section) => section.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for EventData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EventData::Location(a), EventData::Location(b)) => a == b,
            (EventData::Transport(a), EventData::Transport(b)) => a == b,
            (EventData::Message(a), EventData::Message(b)) => a == b,
            (EventData::Custom(a), EventData::Custom(b)) => {
                a.type_tag() == b.type_tag()
                    && canonical_string(&a.to_json()) == canonical_string(&b.to_json())
            }
            (EventData::Raw(a), EventData::Raw(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Location> for EventData {
    fn from(section: Location) -> Self {
        EventData::Location(section)
    }
}

impl From<Transport> for EventData {
    fn from(section: Transport) -> Self {
        EventData::Transport(section)
    }
}

impl From<Message> for EventData {
    fn from(section: Message) -> Self {
        EventData::Message(section)
    }
}

impl From<RawJson> for EventData {
    fn from(section: RawJson) -> Self {
        EventData::Raw(section)
    }
}

/// Key of a type-index bucket.
///
/// Every unregistered section lands in the single [`SectionKind::Raw`] bucket,
/// whatever its `type` property says.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// [`Location`] sections.
    Location,
    /// [`Transport`] sections.
    Transport,
    /// [`Message`] sections.
    Message,
    /// User sections with the given tag.
    Custom(String),
    /// [`RawJson`] passthrough sections.
    Raw,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Location => f.write_str(LOCATION_TYPE),
            SectionKind::Transport => f.write_str(TRANSPORT_TYPE),
            SectionKind::Message => f.write_str(MESSAGE_TYPE),
            SectionKind::Custom(tag) => f.write_str(tag),
            SectionKind::Raw => f.write_str("raw"),
        }
    }
}

/// Concrete section types that can be retrieved from an event or asset by type.
///
/// Built-in types implement this already. A user type implements it with
/// `SectionKind::Custom(tag)` and [`EventData::downcast_custom`]:
///
/// ```rust
/// use std::any::Any;
/// use ambrosus_core::{CustomSection, EventData, SectionKind, TypedSection};
/// use serde_json::{json, Value};
///
/// #[derive(Debug)]
/// struct Temperature(f64);
///
/// impl CustomSection for Temperature {
///     fn type_tag(&self) -> &str { "acme.temperature" }
///     fn to_json(&self) -> Value { json!({"type": "acme.temperature", "celsius": self.0}) }
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// impl TypedSection for Temperature {
///     fn kind() -> SectionKind { SectionKind::Custom("acme.temperature".into()) }
///     fn downcast(data: &EventData) -> Option<&Self> { data.downcast_custom() }
/// }
///
/// let data = EventData::custom(Temperature(4.5));
/// assert_eq!(Temperature::downcast(&data).map(|t| t.0), Some(4.5));
/// ```
pub trait TypedSection: Sized + 'static {
    /// Bucket holding sections of this type.
    fn kind() -> SectionKind;
    /// Borrows the concrete value if `data` is of this type.
    fn downcast(data: &EventData) -> Option<&Self>;
}

impl TypedSection for Location {
    fn kind() -> SectionKind {
        SectionKind::Location
    }

    fn downcast(data: &EventData) -> Option<&Self> {
        match data {
            EventData::Location(section) => Some(section),
            _ => None,
        }
    }
}

impl TypedSection for Transport {
    fn kind() -> SectionKind {
        SectionKind::Transport
    }

    fn downcast(data: &EventData) -> Option<&Self> {
        match data {
            EventData::Transport(section) => Some(section),
            _ => None,
        }
    }
}

impl TypedSection for Message {
    fn kind() -> SectionKind {
        SectionKind::Message
    }

    fn downcast(data: &EventData) -> Option<&Self> {
        match data {
            EventData::Message(section) => Some(section),
            _ => None,
        }
    }
}

impl TypedSection for RawJson {
    fn kind() -> SectionKind {
        SectionKind::Raw
    }

    fn downcast(data: &EventData) -> Option<&Self> {
        match data {
            EventData::Raw(section) => Some(section),
            _ => None,
        }
    }
}

fn required_str(json: &Map<String, Value>, field: &'static str) -> Result<String, SectionDecodeError> {
    match json.get(field) {
        None | Some(Value::Null) => Err(SectionDecodeError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SectionDecodeError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

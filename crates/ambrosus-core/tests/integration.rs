use std::any::Any;

use ambrosus_core::{
    deserialize_event, serialize_event, AssetBuilder, BuildError, CustomSection, EventBuilder,
    EventData, EventRecord, IndexError, Location, Message, MetaData, RawJson, SectionKind,
    SectionRegistry, Transport, TypedSection,
};
use ambrosus_canonical::{canonical_string, Signer};
use serde::Deserialize;
use serde_json::{json, Value};

const ASSET_ID: &str = "0xc2c5ba0dc2fc9ae4a3d8ea4e4a6c1a1e0f6fc4b2f1b62de33ac50a30a56ce9cb";

fn make_signer() -> Signer {
    Signer::from_hex("0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef").unwrap()
}

fn make_event(timestamp: u64, data: Vec<EventData>) -> EventRecord {
    EventBuilder::new()
        .asset_id(ASSET_ID)
        .created_by(make_signer().address().clone())
        .timestamp(timestamp)
        .add_all_data(data)
        .build()
        .unwrap()
}

fn location(name: &str) -> EventData {
    Location::new(46.78, 6.64, name, "Yverdon", "CH").into()
}

#[derive(Debug, Deserialize)]
struct Temperature {
    celsius: f64,
}

impl CustomSection for Temperature {
    fn type_tag(&self) -> &str {
        "acme.temperature"
    }

    fn to_json(&self) -> Value {
        json!({"type": "acme.temperature", "celsius": self.celsius})
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl TypedSection for Temperature {
    fn kind() -> SectionKind {
        SectionKind::Custom("acme.temperature".into())
    }

    fn downcast(data: &EventData) -> Option<&Self> {
        data.downcast_custom()
    }
}

#[test]
fn event_without_asset_id_fails_at_build() {
    let result = EventBuilder::new()
        .created_by(make_signer().address().clone())
        .timestamp(1)
        .build();
    assert_eq!(result.unwrap_err(), BuildError::MissingAssetId);
}

#[test]
fn access_level_defaults_to_zero() {
    let event = make_event(1, vec![]);
    assert_eq!(event.access_level(), 0);
}

#[test]
fn event_sections_keep_insertion_order() {
    let event = make_event(
        1,
        vec![
            Message::new("first").into(),
            location("a"),
            Message::new("second").into(),
            Message::new("third").into(),
        ],
    );

    let messages: Vec<&str> = event
        .sections_of::<Message>()
        .into_iter()
        .map(Message::message)
        .collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert_eq!(event.first_of::<Message>().unwrap().message(), "first");
    assert_eq!(event.last_of::<Message>().unwrap().message(), "third");
    assert!(event.has_data_of::<Location>());
    assert!(!event.has_data_of::<Transport>());
}

#[test]
fn negative_indexing_wraps_once() {
    let event = make_event(
        1,
        vec![
            Message::new("one").into(),
            Message::new("two").into(),
            Message::new("three").into(),
        ],
    );

    assert_eq!(event.section_at::<Message>(-1).unwrap().message(), "three");
    assert_eq!(event.section_at::<Message>(-3).unwrap().message(), "one");
    assert_eq!(event.section_at::<Message>(0).unwrap().message(), "one");
    assert_eq!(
        event.section_at::<Message>(-4).unwrap_err(),
        IndexError::OutOfRange {
            kind: "ambrosus.event.message".into(),
            index: -4,
            len: 3
        }
    );
    assert!(event.section_at::<Message>(3).is_err());

    let section = event.section_ref_at(&SectionKind::Message, -2).unwrap();
    assert_eq!(section.position(), 1);
}

#[test]
fn sections_link_back_to_their_event() {
    let event = make_event(7, vec![location("a"), Message::new("m").into()]);
    for section in event.section_refs() {
        assert!(std::ptr::eq(section.parent(), &event));
    }
    let refs = event.sections_of_kind(&SectionKind::Message);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].position(), 1);
    assert_eq!(refs[0].downcast::<Message>().unwrap().message(), "m");
}

#[test]
fn asset_events_are_sorted_newest_first_and_stably() {
    let older = make_event(100, vec![Message::new("older").into()]);
    let tie_a = make_event(200, vec![Message::new("tie a").into()]);
    let newest = make_event(300, vec![Message::new("newest").into()]);
    let tie_b = make_event(200, vec![Message::new("tie b").into()]);

    let asset = AssetBuilder::new()
        .created_by(make_signer().address().clone())
        .timestamp(50)
        .sequence_number(1)
        .add_all_events([older, tie_a, newest, tie_b])
        .build();

    let order: Vec<&str> = asset
        .sections_of::<Message>()
        .into_iter()
        .map(Message::message)
        .collect();
    assert_eq!(order, vec!["newest", "tie a", "tie b", "older"]);
    assert_eq!(asset.section_at::<Message>(-1).unwrap().message(), "older");
}

#[test]
fn events_containing_a_type_are_deduplicated() {
    let two_locations = make_event(300, vec![location("a"), location("b")]);
    let no_location = make_event(200, vec![Message::new("m").into()]);
    let one_location = make_event(100, vec![Message::new("m").into(), location("c")]);

    let asset = AssetBuilder::new()
        .add_all_events([one_location.clone(), no_location, two_locations.clone()])
        .build();

    let containing = asset.events_containing::<Location>();
    assert_eq!(containing, vec![&two_locations, &one_location]);
    assert_eq!(asset.sections_of::<Location>().len(), 3);

    let last = asset.section_ref_at(&SectionKind::Location, -1).unwrap();
    assert_eq!(last.parent(), &one_location);
    assert_eq!(last.position(), 1);
}

#[test]
fn builders_derive_overridden_copies() {
    let original = make_event(10, vec![Message::new("m").into()]);
    let copy = EventBuilder::from_existing(&original).build().unwrap();
    assert_eq!(copy, original);

    let changed = EventBuilder::from_existing(&original)
        .access_level(3)
        .add_data(Transport::new("ship", "departed", "truck"))
        .build()
        .unwrap();
    assert_eq!(changed.access_level(), 3);
    assert_eq!(changed.data().len(), 2);
    assert_eq!(original.data().len(), 1);

    let asset = AssetBuilder::new().id("a").add_event(original.clone()).build();
    let with_metadata = AssetBuilder::from_existing(&asset)
        .metadata(MetaData::new("bundle", 99))
        .build();
    assert_eq!(with_metadata.id(), Some("a"));
    assert_eq!(with_metadata.events(), asset.events());
    assert_ne!(with_metadata, asset);
}

#[test]
fn unknown_section_round_trips_byte_identically() {
    let signer = make_signer();
    let unknown = json!({"type": "acme.unknown", "z": [3, {"b": 1, "a": null}], "a": {}});
    let body = serialize_event(
        &make_event(5, vec![RawJson::new(unknown.as_object().unwrap().clone()).into()]),
        Some(&signer),
    )
    .unwrap();

    let decoded = deserialize_event(&body, &SectionRegistry::new()).unwrap();
    assert!(matches!(&decoded.data()[0], EventData::Raw(raw) if raw.type_tag() == Some("acme.unknown")));
    assert_eq!(
        canonical_string(&decoded.data()[0].to_json()),
        canonical_string(&unknown)
    );

    let reserialized = serialize_event(&decoded, None).unwrap();
    assert_eq!(reserialized.to_string(), body.to_string());
}

#[test]
fn registered_custom_types_decode_to_their_struct() {
    let mut registry = SectionRegistry::new();
    registry.register_custom::<Temperature>("acme.temperature");

    let body = serialize_event(
        &make_event(
            5,
            vec![
                EventData::custom(Temperature { celsius: 4.5 }),
                Message::new("cold").into(),
            ],
        ),
        Some(&make_signer()),
    )
    .unwrap();

    let decoded = deserialize_event(&body, &registry).unwrap();
    assert_eq!(decoded.first_of::<Temperature>().unwrap().celsius, 4.5);
    assert!(decoded.has_data_of::<Message>());

    let raw = deserialize_event(&body, &SectionRegistry::empty()).unwrap();
    assert!(!raw.has_data_of::<Temperature>());
    assert_eq!(raw.sections_of::<RawJson>().len(), 2);
}

#[test]
fn malformed_bodies_decode_to_none() {
    let registry = SectionRegistry::new();
    for body in [
        json!(null),
        json!([]),
        json!({}),
        json!({"content": {}}),
        json!({"content": {"idData": {"createdBy": "0xabc", "timestamp": 1, "accessLevel": 0}}}),
        json!({"content": {"idData": {"assetId": "a", "createdBy": 5, "timestamp": 1, "accessLevel": 0}}}),
        json!({"content": {"idData": {"assetId": "a", "createdBy": "0xabc", "timestamp": -1, "accessLevel": 0}}}),
        json!({"content": {"idData": {"assetId": "a", "createdBy": "0xabc", "timestamp": 1, "accessLevel": 0}}, "metadata": {"bundleId": 3}}),
    ] {
        assert!(deserialize_event(&body, &registry).is_none(), "{body}");
    }
}

#[test]
fn bad_sections_are_dropped_but_the_event_survives() {
    let body = json!({
        "eventId": "0xevent",
        "content": {
            "idData": {"assetId": "a", "createdBy": "0xabc", "timestamp": 1, "accessLevel": 2},
            "data": [
                {"type": "ambrosus.asset.location", "name": "no coordinates"},
                "string",
                {"type": "ambrosus.event.message", "name": "kept"}
            ]
        }
    });
    let event = deserialize_event(&body, &SectionRegistry::new()).unwrap();
    assert_eq!(event.id(), Some("0xevent"));
    assert_eq!(event.access_level(), 2);
    assert_eq!(event.data(), &[EventData::Message(Message::new("kept"))]);
    assert!(event.signature().is_none());
}

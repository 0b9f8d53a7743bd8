use ambrosus_canonical::{Address, Signer};
use ambrosus_core::{
    AssetBuilder, BuildError, EventBuilder, GroupToken, Location, Message, SectionRegistry,
};
use ambrosus_sdk::{Sdk, SdkConfig, SdkError};
use serde_json::json;

const TEST_KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

fn make_sdk() -> Sdk {
    Sdk::new(SdkConfig::new("https://gateway.test", TEST_KEY)).unwrap()
}

#[test]
fn short_private_key_derives_reference_address() {
    let sdk = Sdk::new(SdkConfig::new("https://gateway.test", "0x012345")).unwrap();
    assert_eq!(
        sdk.address(),
        &Address::new("0xae0478140036d14e93A7B7482512e1d91745B650")
    );
    assert_eq!(sdk.base_url(), "https://gateway.test");
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(matches!(
        Sdk::new(SdkConfig::new("u", "not a key")),
        Err(SdkError::Crypto(_))
    ));
    assert!(matches!(
        Sdk::new(SdkConfig::new("u", TEST_KEY).with_sequence_bound(0)),
        Err(SdkError::Config(_))
    ));
}

#[test]
fn asset_completion_fills_only_missing_fields() {
    let sdk = make_sdk();
    let completed = sdk.complete_asset(AssetBuilder::new());
    assert_eq!(completed.created_by.as_ref(), Some(sdk.address()));
    assert!(completed.timestamp.unwrap() > 1_500_000_000);
    assert_eq!(completed.sequence_number, Some(1));

    let preset = sdk.complete_asset(
        AssetBuilder::new()
            .created_by("0x0000000000000000000000000000000000000001")
            .timestamp(42)
            .sequence_number(77),
    );
    assert_eq!(preset.timestamp, Some(42));
    assert_eq!(preset.sequence_number, Some(77));
    assert_eq!(
        preset.created_by,
        Some(Address::new("0x0000000000000000000000000000000000000001"))
    );
    assert_eq!(sdk.sequence().current(), 1);

    assert_eq!(sdk.complete_asset(AssetBuilder::new()).sequence_number, Some(2));
}

#[test]
fn sequence_number_wraps_at_the_configured_bound() {
    let sdk = Sdk::new(SdkConfig::new("u", TEST_KEY).with_sequence_bound(3)).unwrap();
    let numbers: Vec<u32> = (0..4)
        .map(|_| sdk.complete_asset(AssetBuilder::new()).sequence_number.unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 0, 1]);
}

#[test]
fn event_completion_requires_asset_id() {
    let sdk = make_sdk();
    assert!(matches!(
        sdk.complete_event(EventBuilder::new()),
        Err(SdkError::Build(BuildError::MissingAssetId))
    ));
    assert!(sdk.prepare_event(EventBuilder::new().timestamp(1)).is_err());
}

#[test]
fn event_completion_uses_default_access_level() {
    let sdk = Sdk::new(SdkConfig::new("u", TEST_KEY).with_default_access_level(2)).unwrap();
    let completed = sdk
        .complete_event(EventBuilder::new().asset_id("0xasset"))
        .unwrap();
    assert_eq!(completed.access_level, Some(2));
    assert_eq!(completed.created_by.as_ref(), Some(sdk.address()));
    assert!(completed.timestamp.is_some());

    let explicit = sdk
        .complete_event(EventBuilder::new().asset_id("0xasset").access_level(5))
        .unwrap();
    assert_eq!(explicit.access_level, Some(5));
}

#[test]
fn prepared_bodies_parse_and_verify() {
    let sdk = make_sdk();

    let asset_body = sdk.prepare_asset(AssetBuilder::new()).unwrap();
    assert!(sdk.verify_signature(&asset_body));
    let asset = sdk.parse_asset(&asset_body.to_string()).unwrap();
    assert!(sdk.verify_asset(&asset));
    assert_eq!(asset.sequence_number(), Some(1));

    let event_body = sdk
        .prepare_event(
            EventBuilder::new()
                .asset_id("0xasset")
                .add_data(Location::new(1.0, 2.0, "n", "c", "k"))
                .add_data(Message::new("hi")),
        )
        .unwrap();
    assert!(sdk.verify_signature(&event_body));
    let event = sdk.parse_event(&event_body.to_string()).unwrap();
    assert!(sdk.verify_event(&event));
    assert_eq!(event.created_by(), Some(sdk.address()));
    assert_eq!(event.first_of::<Message>().unwrap().message(), "hi");
}

#[test]
fn custom_registry_controls_event_decoding() {
    let sdk = Sdk::with_registry(SdkConfig::new("u", TEST_KEY), SectionRegistry::empty()).unwrap();
    let body = sdk
        .prepare_event(
            EventBuilder::new()
                .asset_id("0xasset")
                .add_data(Message::new("hi")),
        )
        .unwrap();
    let event = sdk.parse_event_value(&body).unwrap();
    assert!(!event.has_data_of::<Message>());
    assert!(sdk.verify_event(&event));
}

#[test]
fn unparseable_responses_are_none() {
    let sdk = make_sdk();
    assert!(sdk.parse_asset("not json").is_none());
    assert!(sdk.parse_event("{").is_none());
    assert!(sdk.parse_event(&json!({"content": 1}).to_string()).is_none());
}

#[test]
fn group_tokens_are_signed_by_the_session_key() {
    let sdk = make_sdk();
    let token = GroupToken::decode(&sdk.create_group_token(1_900_000_000).unwrap()).unwrap();
    assert_eq!(token.created_by(), sdk.address());
    assert_eq!(token.valid_until(), 1_900_000_000);
    assert!(token.verify());

    let other = Signer::from_hex("0x012345").unwrap();
    assert_ne!(token.created_by(), other.address());
}

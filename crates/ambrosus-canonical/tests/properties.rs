use ambrosus_canonical::{canonical_string, canonicalize, hash_hex, verify, Signer};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-zA-Z_]{1,6}", inner), 0..6).prop_map(|entries| {
                Value::Object(entries.into_iter().collect::<Map<String, Value>>())
            }),
        ]
    })
}

/// Rebuilds every object with its keys rotated by `shift`, leaving arrays in place.
fn rotate_keys(value: &Value, shift: usize) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            if !entries.is_empty() {
                let len = entries.len();
                entries.rotate_left(shift % len);
            }
            Value::Object(
                entries
                    .into_iter()
                    .rev()
                    .map(|(k, v)| (k.clone(), rotate_keys(v, shift)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| rotate_keys(v, shift)).collect()),
        other => other.clone(),
    }
}

fn arb_signer() -> impl Strategy<Value = Signer> {
    prop::array::uniform32(any::<u8>())
        .prop_filter_map("not a valid secp256k1 scalar", |bytes| Signer::from_bytes(&bytes).ok())
}

proptest! {
    #[test]
    fn canonicalize_is_idempotent(value in arb_json()) {
        let once = canonicalize(&value);
        prop_assert_eq!(canonical_string(&once), canonical_string(&canonicalize(&once)));
    }

    #[test]
    fn canonical_form_ignores_key_order(value in arb_json(), shift in 0usize..8) {
        let permuted = rotate_keys(&value, shift);
        prop_assert_eq!(canonical_string(&value), canonical_string(&permuted));
    }

    #[test]
    fn array_order_is_significant(a in "[a-z]{1,4}", b in "[A-Z]{1,4}") {
        let forward = Value::Array(vec![Value::String(a.clone()), Value::String(b.clone())]);
        let backward = Value::Array(vec![Value::String(b), Value::String(a)]);
        prop_assert_ne!(hash_hex(&canonical_string(&forward)), hash_hex(&canonical_string(&backward)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn signatures_verify_against_signer_address(signer in arb_signer(), message in ".{0,64}") {
        let signature = signer.sign(&message).unwrap();
        prop_assert!(verify(&message, signer.address().as_str(), signature.as_str()));
    }

    #[test]
    fn flipping_a_byte_breaks_verification(
        signer in arb_signer(),
        message in "[ -~]{1,32}",
        position in 0usize..65,
        mask in 1u8..=255,
    ) {
        let signature = signer.sign(&message).unwrap();
        let mut bytes = signature.to_bytes().unwrap();
        bytes[position] ^= mask;
        let tampered = format!("0x{}", hex::encode(&bytes));
        prop_assert!(!verify(&message, signer.address().as_str(), &tampered));
    }

    #[test]
    fn changing_the_message_breaks_verification(signer in arb_signer(), message in "[ -~]{1,32}") {
        let signature = signer.sign(&message).unwrap();
        let altered = format!("{message}.");
        prop_assert!(!verify(&altered, signer.address().as_str(), signature.as_str()));
    }
}

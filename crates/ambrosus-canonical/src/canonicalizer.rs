use serde::Serialize;
use serde_json::{Map, Value};

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// The input could not be turned into a JSON tree.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Returns a copy of `value` with object keys in ascending order at every level.
///
/// Objects nested inside arrays are reordered as well, but arrays keep their
/// element order: position inside a data array is meaningful. Nulls, empty
/// objects and empty arrays are kept as they are. The input is never mutated.
///
/// # Example
///
/// ```rust
/// use ambrosus_canonical::{canonical_string, canonicalize};
/// use serde_json::json;
///
/// let value = json!({"timestamp": 123, "createdBy": "0xABC", "sequenceNumber": 3});
/// let canonical = canonicalize(&value);
/// assert_eq!(
///     canonical_string(&canonical),
///     r#"{"createdBy":"0xABC","sequenceNumber":3,"timestamp":123}"#
/// );
/// ```
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}

/// Compact JSON text of the canonical form of `value`.
///
/// This is the exact string fed to [`crate::hash_message`] and
/// [`crate::Signer::sign`] for data hashes and signatures.
pub fn canonical_string(value: &Value) -> String {
    canonicalize(value).to_string()
}

/// UTF-8 bytes of [`canonical_string`].
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    canonical_string(value).into_bytes()
}

/// Serializes any value and returns its canonical tree.
pub fn to_canonical_value<T: Serialize>(value: &T) -> Result<Value, CanonicalizationError> {
    let tree = serde_json::to_value(value)?;
    Ok(canonicalize(&tree))
}

use thiserror::Error;

/// Failure to encode or decode an asset, event or group token.
#[derive(Error, Debug)]
pub enum WireError {
    /// A field required on the wire is absent from the entity or the payload.
    #[error("missing field: {0}")]
    MissingField(&'static str),
    /// A field is present but has the wrong JSON type or shape.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        /// Wire name of the field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// The signature is absent and no signer was supplied to compute it.
    #[error("signature is absent and no signer was supplied")]
    MissingSigner,
    /// Signing failed.
    #[error("signing failed: {0}")]
    Crypto(#[from] ambrosus_canonical::CryptoError),
    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Group token text was not valid base64.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl WireError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        WireError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Builder precondition violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An event must name the asset it is attached to.
    #[error("missing asset ID in event builder")]
    MissingAssetId,
}

/// Positional lookup into a type bucket failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The index does not resolve inside the bucket, even after one wrap.
    #[error("index {index} out of range for {len} section(s) of type {kind}")]
    OutOfRange {
        /// Section kind that was looked up.
        kind: String,
        /// Requested index, possibly negative.
        index: isize,
        /// Bucket length.
        len: usize,
    },
}

/// A single event-data element could not be decoded.
#[derive(Error, Debug)]
pub enum SectionDecodeError {
    /// The element is not a JSON object.
    #[error("event data element is not a json object")]
    NotAnObject,
    /// The element has no string `type` property.
    #[error("unable to find type for event data element")]
    MissingType,
    /// A property required by the section type is absent or null.
    #[error("missing property {0}")]
    MissingField(&'static str),
    /// A property has the wrong shape.
    #[error("invalid property {field}: {reason}")]
    InvalidField {
        /// Property name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// Serde decoding of a registered section type failed.
    #[error("deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

use crate::digest::keccak256;
use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new instance without validation; callers are responsible for conformity.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Borrows the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    Address,
    "Account address: `0x` followed by 40 hex digits, mixed-case checksum in canonical form.",
    r"^0x[0-9a-fA-F]{40}$"
);
newtype!(
    HexSignature,
    "Recoverable signature `r || s || v` as `0x` followed by 130 hex digits.",
    r"^0x[0-9a-fA-F]{130}$"
);
newtype!(
    HexDigest,
    "32-byte digest as `0x` followed by 64 lowercase hex digits.",
    r"^0x[0-9a-f]{64}$"
);

impl Address {
    /// Returns true when the address carries a valid mixed-case checksum.
    pub fn is_checksummed(&self) -> bool {
        let Some(body) = self.0.strip_prefix("0x") else {
            return false;
        };
        match hex::decode(body) {
            Ok(bytes) => match <[u8; 20]>::try_from(bytes.as_slice()) {
                Ok(raw) => to_checksum_address(&raw).0 == self.0,
                Err(_) => false,
            },
            Err(_) => false,
        }
    }
}

impl HexDigest {
    /// Encodes raw digest bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }
}

impl HexSignature {
    /// Encodes a 65-byte `r || s || v` signature.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Decodes the signature bytes, whatever their length.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        decode_hex("signature", &self.0)
    }
}

/// Renders a 20-byte account id with the EIP-55 mixed-case checksum.
///
/// Each hex letter is uppercased when the matching nibble of
/// `keccak256(lowercase_hex)` is 8 or more.
pub fn to_checksum_address(raw: &[u8; 20]) -> Address {
    let lower = hex::encode(raw);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Address(out)
}

/// Decodes `0x`-prefixed (or bare) hex into bytes.
pub(crate) fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, ValidationError> {
    let body = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(body).map_err(|_| ValidationError::PatternMismatch {
        field,
        value: value.to_string(),
    })
}

use std::fmt;

use serde::Deserialize;

/// Default modulus of the per-session asset sequence number.
pub const DEFAULT_SEQUENCE_BOUND: u32 = 1_000_000;

fn default_sequence_bound() -> u32 {
    DEFAULT_SEQUENCE_BOUND
}

/// Settings for an [`crate::Sdk`].
///
/// Loading these from files or the environment is left to the caller; the
/// struct only derives `Deserialize`. `Debug` never prints the private key.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SdkConfig {
    /// Base URL of the REST API the prepared bodies are sent to.
    pub base_url: String,
    /// Hex private key, `0x` optional. Keys shorter than 32 bytes are left-padded.
    pub private_key: String,
    /// Sequence numbers run from 1 and wrap to 0 at this bound.
    #[serde(default = "default_sequence_bound")]
    pub sequence_bound: u32,
    /// Access level given to events that do not set one.
    #[serde(default)]
    pub default_access_level: u32,
}

impl SdkConfig {
    /// Config with default sequence bound and access level.
    pub fn new(base_url: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            private_key: private_key.into(),
            sequence_bound: DEFAULT_SEQUENCE_BOUND,
            default_access_level: 0,
        }
    }

    /// Overrides the sequence bound.
    pub fn with_sequence_bound(mut self, bound: u32) -> Self {
        self.sequence_bound = bound;
        self
    }

    /// Overrides the default access level.
    pub fn with_default_access_level(mut self, access_level: u32) -> Self {
        self.default_access_level = access_level;
        self
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("base_url", &self.base_url)
            .field("private_key", &"<redacted>")
            .field("sequence_bound", &self.sequence_bound)
            .field("default_access_level", &self.default_access_level)
            .finish()
    }
}

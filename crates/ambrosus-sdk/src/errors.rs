use thiserror::Error;

/// Errors surfaced by [`crate::Sdk`].
#[derive(Error, Debug)]
pub enum SdkError {
    /// The configured private key is unusable, or signing failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] ambrosus_canonical::CryptoError),
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A builder precondition was violated.
    #[error("build error: {0}")]
    Build(#[from] ambrosus_core::BuildError),
    /// Wire encoding failed.
    #[error("wire error: {0}")]
    Wire(#[from] ambrosus_core::WireError),
}

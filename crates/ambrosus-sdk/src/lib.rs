//! Orchestration helper for the Ambrosus record model.
//!
//! An [`Sdk`] holds one account key and turns builders into signed request
//! bodies: it fills the creator address, the current timestamp, a bounded
//! per-session sequence number for assets and a default access level for
//! events, then signs and canonicalizes. Responses are parsed back into
//! immutable records. HTTP transport is not part of this crate.
//!
#![deny(missing_docs)]

/// Session settings.
pub mod config;
/// Error types for SDK operations.
pub mod errors;
/// Bounded asset sequence numbering.
pub mod sequence;
/// The signing session.
pub mod session;

pub use config::{SdkConfig, DEFAULT_SEQUENCE_BOUND};
pub use errors::SdkError;
pub use sequence::SequenceCounter;
pub use session::Sdk;

pub use ambrosus_canonical;
pub use ambrosus_core;

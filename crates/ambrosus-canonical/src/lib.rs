//! Canonical form and signing primitives for Ambrosus assets and events.
//!
//! Every byte that participates in a data hash or a signature is produced by
//! this crate: nested JSON trees are reordered into ascending key order, the
//! resulting text is hashed with the Ethereum personal-sign Keccak256 scheme,
//! and identity fields are signed with recoverable secp256k1 ECDSA.
//!
//! The crate performs no I/O and holds no global state. Signing keys are passed
//! around explicitly as a [`Signer`] capability.
//!
#![deny(missing_docs)]

/// Deterministic key ordering for nested JSON trees.
pub mod canonicalizer;
/// Keccak256 personal-sign message hashing.
pub mod digest;
/// Address, signature and digest newtypes.
pub mod identifiers;
/// Path lookups inside nested JSON objects.
pub mod lookup;
/// Recoverable secp256k1 signing and verification.
pub mod signing;
/// Validation helpers used by identifier types.
pub mod validation;

pub use canonicalizer::{
    canonical_bytes, canonical_string, canonicalize, to_canonical_value, CanonicalizationError,
};
pub use digest::{hash_hex, hash_matches, hash_message, keccak256, ETH_PREAMBLE};
pub use identifiers::{to_checksum_address, Address, HexDigest, HexSignature};
pub use lookup::element_with_path;
pub use signing::{recover_address, verify, CryptoError, Signer, RECOVERY_ID_OFFSET};
pub use validation::ValidationError;

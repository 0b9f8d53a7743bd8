//! Message hashing with the Ethereum personal-sign preamble.
//!
//! A message `m` hashes to `keccak256("\x19Ethereum Signed Message:\n" || len(m) || m)`
//! where `len(m)` is the decimal UTF-8 byte length of `m`. Data hashes and
//! signatures over canonical JSON both go through [`hash_message`].

use sha3::{Digest as Sha3Digest, Keccak256};

use crate::identifiers::HexDigest;

/// Preamble prepended to every message before hashing.
pub const ETH_PREAMBLE: &str = "\u{0019}Ethereum Signed Message:\n";

/// Plain Keccak256 over raw bytes.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    Keccak256::digest(bytes).into()
}

/// Personal-sign hash of `message`.
///
/// # Example
///
/// ```rust
/// use ambrosus_canonical::hash_hex;
///
/// assert_eq!(
///     hash_hex("Test message").as_ref(),
///     "0xd81bbffb92157b72ceae3da72eb8224976ba42a49621822789edb0735a0e0395"
/// );
/// ```
pub fn hash_message(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(ETH_PREAMBLE.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Personal-sign hash of `message` as lowercase `0x`-prefixed hex.
pub fn hash_hex(message: &str) -> HexDigest {
    HexDigest::from_bytes(&hash_message(message))
}

/// Returns true when `candidate` is exactly the hex hash of `message`.
pub fn hash_matches(message: &str, candidate: &str) -> bool {
    hash_hex(message).as_ref() == candidate
}

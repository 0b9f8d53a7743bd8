//! Recoverable secp256k1 signatures over personal-sign hashes.
//!
//! Signatures are 65 bytes laid out as `r[32] || s[32] || v[1]` and travel as
//! `0x`-prefixed hex. `v` is always `27 + recovery_id` with `recovery_id` in
//! `{0, 1}`; recovery subtracts the same [`RECOVERY_ID_OFFSET`] and rejects any
//! other value. `s` is always low (k256 normalizes on signing and rejects
//! high-`s` on recovery).

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::fmt;

use crate::digest::{hash_message, keccak256};
use crate::identifiers::{decode_hex, to_checksum_address, Address, HexSignature};
use crate::validation::ValidationError;

/// Offset added to the recovery id to form the trailing `v` byte.
pub const RECOVERY_ID_OFFSET: u8 = 27;

const SIGNATURE_LENGTH: usize = 65;
const SCALAR_LENGTH: usize = 32;

/// Errors raised while handling keys or signatures.
///
/// [`verify`] swallows all of these and answers `false`.
#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    /// The private key is not a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// Hex decoding of a key or signature failed.
    #[error("malformed hex: {0}")]
    MalformedHex(#[from] ValidationError),
    /// Signature is not 65 bytes long.
    #[error("signature must be 65 bytes, got {0}")]
    WrongSignatureLength(usize),
    /// Trailing `v` byte is neither 27 nor 28.
    #[error("invalid recovery byte {0}")]
    InvalidRecoveryId(u8),
    /// Underlying ECDSA failure (scalar out of range, unrecoverable key, ...).
    #[error("ecdsa error: {0}")]
    Ecdsa(#[from] k256::ecdsa::Error),
}

/// Signing capability bound to one private key.
///
/// The key stays in memory for the lifetime of the value and is never
/// formatted; `Debug` only shows the derived address.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
    address: Address,
}

impl Signer {
    /// Builds a signer from big-endian key bytes, left-padding keys shorter than 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() > SCALAR_LENGTH {
            return Err(CryptoError::InvalidPrivateKey(format!(
                "{} bytes is longer than {SCALAR_LENGTH}",
                bytes.len()
            )));
        }
        let mut padded = [0u8; SCALAR_LENGTH];
        padded[SCALAR_LENGTH - bytes.len()..].copy_from_slice(bytes);

        let key = SigningKey::from_slice(&padded)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Builds a signer from a hex private key, `0x` prefix optional.
    pub fn from_hex(private_key: &str) -> Result<Self, CryptoError> {
        let bytes = decode_hex("private_key", private_key)?;
        Self::from_bytes(&bytes)
    }

    /// Checksum address derived from the public key.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Signs the personal-sign hash of `message`.
    pub fn sign(&self, message: &str) -> Result<HexSignature, CryptoError> {
        let hash = hash_message(message);
        let (signature, recovery_id) = self.key.sign_prehash_recoverable(&hash)?;

        let mut rsv = [0u8; SIGNATURE_LENGTH];
        rsv[..2 * SCALAR_LENGTH].copy_from_slice(&signature.to_bytes());
        rsv[2 * SCALAR_LENGTH] = RECOVERY_ID_OFFSET + recovery_id.to_byte();
        Ok(HexSignature::from_bytes(&rsv))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Recovers the checksum address that produced `signature` over `message`.
pub fn recover_address(message: &str, signature: &str) -> Result<Address, CryptoError> {
    let bytes = decode_hex("signature", signature)?;
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::WrongSignatureLength(bytes.len()));
    }

    let v = bytes[2 * SCALAR_LENGTH];
    let recovery_id = match v {
        27 | 28 => RecoveryId::from_byte(v - RECOVERY_ID_OFFSET),
        _ => None,
    }
    .ok_or(CryptoError::InvalidRecoveryId(v))?;

    let rs = Signature::from_slice(&bytes[..2 * SCALAR_LENGTH])?;
    let hash = hash_message(message);
    let key = VerifyingKey::recover_from_prehash(&hash, &rs, recovery_id)?;
    Ok(address_of(&key))
}

/// Returns true when `signature` over `message` recovers to exactly `claimed`.
///
/// Defined for every input: malformed hex, short signatures and bad recovery
/// bytes all yield `false`.
pub fn verify(message: &str, claimed: &str, signature: &str) -> bool {
    match recover_address(message, signature) {
        Ok(recovered) => recovered.as_str() == claimed,
        Err(err) => {
            tracing::debug!(error = %err, "signature recovery failed");
            false
        }
    }
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.as_affine().to_encoded_point(false);
    // Uncompressed SEC1: 0x04 || x || y
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut raw = [0u8; 20];
    raw.copy_from_slice(&hash[12..]);
    to_checksum_address(&raw)
}

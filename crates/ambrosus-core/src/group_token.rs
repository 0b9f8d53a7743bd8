use ambrosus_canonical::{
    canonical_string, canonicalize, verify, Address, CryptoError, HexSignature, Signer,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::WireError;
use crate::wire::compute_signature;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenIdData {
    created_by: Address,
    valid_until: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBody {
    id_data: TokenIdData,
    signature: HexSignature,
}

/// Self-signed access token: `{ idData: { createdBy, validUntil }, signature }`,
/// carried as standard base64 of its canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupToken {
    body: TokenBody,
}

impl GroupToken {
    /// Signs a token for the signer's address, valid until `valid_until` (unix seconds).
    pub fn create(signer: &Signer, valid_until: u64) -> Result<Self, CryptoError> {
        let id_data = TokenIdData {
            created_by: signer.address().clone(),
            valid_until,
        };
        let signature = compute_signature(&id_data_value(&id_data), signer)?;
        Ok(Self {
            body: TokenBody { id_data, signature },
        })
    }

    /// Address that signed the token.
    pub fn created_by(&self) -> &Address {
        &self.body.id_data.created_by
    }

    /// Expiry, unix seconds.
    pub fn valid_until(&self) -> u64 {
        self.body.id_data.valid_until
    }

    /// Signature over the canonical `idData`.
    pub fn signature(&self) -> &HexSignature {
        &self.body.signature
    }

    /// Canonical JSON form.
    pub fn to_json(&self) -> Value {
        canonicalize(&serde_json::json!({
            "idData": id_data_value(&self.body.id_data),
            "signature": self.body.signature,
        }))
    }

    /// Base64 text sent as the token.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_json().to_string())
    }

    /// Parses token text produced by [`GroupToken::encode`].
    ///
    /// The signature is not checked; call [`GroupToken::verify`].
    pub fn decode(token: &str) -> Result<Self, WireError> {
        let bytes = STANDARD.decode(token.trim())?;
        let body: TokenBody = serde_json::from_slice(&bytes)?;
        Ok(Self { body })
    }

    /// Whether the signature recovers to `createdBy`.
    pub fn verify(&self) -> bool {
        verify(
            &canonical_string(&id_data_value(&self.body.id_data)),
            self.body.id_data.created_by.as_str(),
            self.body.signature.as_str(),
        )
    }

    /// Whether the token has expired at `now` (unix seconds).
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.body.id_data.valid_until
    }
}

fn id_data_value(id_data: &TokenIdData) -> Value {
    serde_json::json!({
        "createdBy": id_data.created_by,
        "validUntil": id_data.valid_until,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_signer() -> Signer {
        Signer::from_hex("0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef")
            .unwrap()
    }

    #[test]
    fn encoded_token_decodes_and_verifies() {
        let token = GroupToken::create(&make_signer(), 1_700_000_000).unwrap();
        let decoded = GroupToken::decode(&token.encode()).unwrap();
        assert_eq!(decoded, token);
        assert!(decoded.verify());
        assert!(!decoded.is_expired_at(1_700_000_000));
        assert!(decoded.is_expired_at(1_700_000_001));
    }

    #[test]
    fn token_json_is_canonical() {
        let token = GroupToken::create(&make_signer(), 5).unwrap();
        let text = token.to_json().to_string();
        assert!(text.starts_with(r#"{"idData":{"createdBy":"0x"#));
        assert!(text.contains(r#","validUntil":5},"signature":"0x"#));
    }

    #[test]
    fn extending_validity_breaks_the_signature() {
        let token = GroupToken::create(&make_signer(), 5).unwrap();
        let mut forged = token.clone();
        forged.body.id_data.valid_until = 500;
        assert!(!forged.verify());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(GroupToken::decode("***"), Err(WireError::Base64(_))));
        let not_json = STANDARD.encode("hello");
        assert!(matches!(GroupToken::decode(&not_json), Err(WireError::Json(_))));
    }
}

//! Signer (other half of component B): signs and verifies messages over
//! their canonical form, per spec §4.B.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde_json::{Map, Value};

use crate::canon::{canonicalize, without_signature};

/// Signs `message` with `key`, returning the base58-encoded signature. The
/// `signature` key, if already present in `message`, is excluded from the
/// bytes being signed, so assembly order of the caller's object never
/// matters.
pub fn sign(key: &SigningKey, message: &Value) -> String {
    let stripped = without_signature(message);
    let bytes = canonicalize(&stripped);
    let signature: Signature = key.sign(bytes.as_bytes());
    bs58::encode(signature.to_bytes()).into_string()
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("message has no signature field")]
    MissingSignature,
    #[error("signature is not valid base58: {0}")]
    BadEncoding(String),
    #[error("signature is not 64 bytes")]
    BadLength,
    #[error("signature does not verify")]
    InvalidSignature,
}

/// Verifies that `message`'s `signature` field was produced by `key` over
/// the message's canonical form with `signature` excluded.
pub fn verify(key: &VerifyingKey, message: &Value) -> Result<(), VerifyError> {
    let sig_b58 = message
        .get("signature")
        .and_then(Value::as_str)
        .ok_or(VerifyError::MissingSignature)?;

    let raw = bs58::decode(sig_b58)
        .into_vec()
        .map_err(|e| VerifyError::BadEncoding(e.to_string()))?;
    let bytes: [u8; 64] = raw.try_into().map_err(|_| VerifyError::BadLength)?;
    let signature = Signature::from_bytes(&bytes);

    let stripped = without_signature(message);
    let canon = canonicalize(&stripped);

    key.verify(canon.as_bytes(), &signature)
        .map_err(|_| VerifyError::InvalidSignature)
}

/// Attaches `signature` to a mutable request object, computed over the
/// object as it stands (any prior `signature` value is ignored/overwritten).
pub fn attach_signature(key: &SigningKey, message: &mut Map<String, Value>) {
    let signature = sign(key, &Value::Object(message.clone()));
    message.insert("signature".to_string(), Value::String(signature));
}

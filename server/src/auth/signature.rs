//! Ed25519 verification of inbound interaction requests.
//!
//! The platform signs `timestamp ++ body` with its private key and sends the
//! hex signature and the timestamp as headers. Verification runs over the raw
//! request bytes; a parsed-then-reserialized body will not verify.

use axum::http::HeaderMap;
use ed25519_dalek::{Signature, VerifyingKey};
use tracing::{info, warn};

use crate::engine::interaction::InboundEvent;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("public key is not valid hex")]
    Hex(#[from] hex::FromHexError),
    #[error("public key must be 32 bytes, got {0}")]
    Length(usize),
    #[error("public key is not a valid Ed25519 point")]
    Point,
}

/// Checks interaction signatures against the platform's public key.
///
/// A verifier without a key rejects everything.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: Option<VerifyingKey>,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key: Some(key) }
    }

    pub fn unconfigured() -> Self {
        Self { key: None }
    }

    /// Parse a hex-encoded 32-byte public key.
    pub fn from_hex(public_key_hex: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(public_key_hex.trim())?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::Point)?;
        Ok(Self::new(key))
    }

    /// Build the verifier at startup. A missing or bad key is logged and
    /// leaves the verifier closed rather than aborting the process.
    pub fn from_config(public_key_hex: &str) -> Self {
        if public_key_hex.trim().is_empty() {
            warn!("No interaction public key configured; all interactions will be rejected");
            return Self::unconfigured();
        }
        match Self::from_hex(public_key_hex) {
            Ok(verifier) => {
                info!("Interaction signature verification enabled");
                verifier
            }
            Err(e) => {
                warn!(error = %e, "Invalid interaction public key; all interactions will be rejected");
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Returns true only when the event carries a valid signature over its raw bytes.
    pub fn verify(&self, event: &InboundEvent) -> bool {
        self.verify_parts(event.headers(), event.raw_body())
    }

    pub fn verify_parts(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        let Some(signature_hex) = header_str(headers, SIGNATURE_HEADER) else {
            return false;
        };
        let Some(timestamp) = header_str(headers, TIMESTAMP_HEADER) else {
            return false;
        };
        if body.is_empty() {
            return false;
        }

        let Some(signature) = decode_signature(signature_hex) else {
            return false;
        };

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        key.verify_strict(&message, &signature).is_ok()
    }
}

/// Header lookup is case-insensitive; empty or non-visible-ASCII values count as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn decode_signature(signature_hex: &str) -> Option<Signature> {
    let bytes = hex::decode(signature_hex).ok()?;
    let bytes: [u8; 64] = bytes.as_slice().try_into().ok()?;
    Some(Signature::from_bytes(&bytes))
}

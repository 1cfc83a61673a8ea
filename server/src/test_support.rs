//! Shared fixtures for unit and integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use ed25519_dalek::{Signer, SigningKey};
use reqwest::Method;
use serde_json::Value;

use crate::auth::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::platform::client::{PlatformApi, PlatformError};

/// Fixed key so signatures are reproducible across runs.
pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

pub fn public_key_hex() -> String {
    hex::encode(signing_key().verifying_key().to_bytes())
}

pub fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}

/// Headers carrying a valid signature for `timestamp ++ body`.
pub fn signed_headers(timestamp: &str, body: &[u8]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        SIGNATURE_HEADER,
        HeaderValue::from_str(&sign(timestamp, body)).unwrap(),
    );
    headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(timestamp).unwrap());
    headers
}

pub type RecordedCall = (Method, String, Option<Value>);

/// In-memory `PlatformApi` that records every call.
///
/// Queued responses are returned in order, then `Value::Null`. `fail_with`
/// makes every subsequent call fail with that HTTP status.
#[derive(Default)]
pub struct FakePlatform {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Value>>,
    fail_status: Mutex<Option<u16>>,
}

impl FakePlatform {
    pub fn respond(&self, value: Value) {
        self.responses.lock().unwrap().push_back(value);
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, PlatformError> {
        self.calls
            .lock()
            .unwrap()
            .push((method, path.to_string(), body.cloned()));

        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err(PlatformError::Http {
                status,
                body: "fake failure".into(),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::Null))
    }
}

//! Payload codec.
//!
//! All body encoding and decoding goes through here; handlers never see the
//! wire format.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{HttpError, ResponseError};
use crate::response::StatusCode;

/// Content type of encoded bodies.
pub const CONTENT_TYPE: &str = "application/json";

/// Decode a request body.
///
/// Failures are client errors (400) whose message starts with
/// `decoding json:`.
pub fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, HttpError> {
    serde_json::from_slice(bytes).map_err(|e| {
        HttpError::new(StatusCode::BAD_REQUEST).with_detail(format!("decoding json: {e}"))
    })
}

/// Encode a response body.
pub fn encode_body<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(value).map_err(EncodeError)
}

/// Encoded `{"error": "<message>"}` document.
#[must_use]
pub fn error_body(message: &str) -> Vec<u8> {
    serde_json::json!({ "error": message }).to_string().into_bytes()
}

/// A response value could not be encoded. Internal: no status.
#[derive(Debug)]
pub struct EncodeError(serde_json::Error);

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "encoding json: {}", self.0)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl ResponseError for EncodeError {}

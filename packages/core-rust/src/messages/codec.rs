//! Body encodings shared by the server and the HTTP fetch collaborator.
//!
//! JSON is the default. `MsgPack` bodies use named maps
//! (`rmp_serde::to_vec_named`) so field names match the JSON form.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Content type of JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type of `MsgPack` bodies.
pub const MSGPACK_CONTENT_TYPE: &str = "application/msgpack";

/// Body encoding negotiated through `Accept` / `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Json,
    MsgPack,
}

/// Encoding or decoding failure.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("msgpack encode: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),
    #[error("msgpack decode: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}

impl WireFormat {
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Json => JSON_CONTENT_TYPE,
            WireFormat::MsgPack => MSGPACK_CONTENT_TYPE,
        }
    }

    /// Picks the format for an `Accept` header value. Anything that does not
    /// mention `MsgPack` gets JSON.
    #[must_use]
    pub fn from_accept(accept: Option<&str>) -> Self {
        match accept {
            Some(value) if value.contains(MSGPACK_CONTENT_TYPE) => WireFormat::MsgPack,
            _ => WireFormat::Json,
        }
    }

    /// # Errors
    ///
    /// Returns a [`CodecError`] if `value` cannot be serialized.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(match self {
            WireFormat::Json => serde_json::to_vec(value)?,
            WireFormat::MsgPack => rmp_serde::to_vec_named(value)?,
        })
    }

    /// # Errors
    ///
    /// Returns a [`CodecError`] if `bytes` is not a valid body for `T`.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(match self {
            WireFormat::Json => serde_json::from_slice(bytes)?,
            WireFormat::MsgPack => rmp_serde::from_slice(bytes)?,
        })
    }
}

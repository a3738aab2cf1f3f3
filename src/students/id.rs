//! Conversion between MongoDB `ObjectId`s and the hex strings used in API payloads.

use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// A string that does not encode an `ObjectId`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid student id: expected 24 hexadecimal characters")]
pub struct MalformedIdentifier {
    /// The rejected input.
    pub value: String,
}

/// Render an identifier as its 24-character lowercase hex form.
pub fn encode_id(id: &ObjectId) -> String {
    id.to_hex()
}

/// Parse the hex form produced by [`encode_id`].
pub fn decode_id(value: &str) -> Result<ObjectId, MalformedIdentifier> {
    ObjectId::parse_str(value).map_err(|_| MalformedIdentifier {
        value: value.to_string(),
    })
}

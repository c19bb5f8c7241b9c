//! JSON helpers producing byte-stable output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Serializes a value to deterministic JSON bytes.
///
/// Two-space indentation and a trailing newline. Object key order follows the
/// source types, so maps must be `BTreeMap` for sorted keys.
///
/// # Errors
/// Returns `SerializationError::Serialize` if the value cannot be encoded.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(SerializationError::Serialize)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Deserializes JSON bytes, pretty or minified.
///
/// # Errors
/// Returns `SerializationError::Deserialize` if the bytes do not decode to `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

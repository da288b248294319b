//! Message codec — framing and serialization for chain-update bundles.

use crate::MessageError;

/// Maximum message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// Encode a message for transmission: bincode payload behind a 4-byte
/// big-endian length prefix.
pub fn encode(message: &impl serde::Serialize) -> Result<Vec<u8>, MessageError> {
    let payload = bincode::serialize(message).map_err(|e| MessageError::Malformed(e.to_string()))?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(MessageError::MessageTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    framed.extend_from_slice(&payload);
    Ok(framed)
}

/// Decode a framed message produced by [`encode`].
pub fn decode<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, MessageError> {
    if data.len() < 4 {
        return Err(MessageError::Malformed("frame shorter than length prefix".into()));
    }
    let declared = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if declared > MAX_MESSAGE_SIZE {
        return Err(MessageError::MessageTooLarge {
            size: declared,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let payload = &data[4..];
    if payload.len() != declared {
        return Err(MessageError::Malformed(format!(
            "frame length mismatch: declared {declared}, got {}",
            payload.len()
        )));
    }
    bincode::deserialize(payload).map_err(|e| MessageError::Malformed(e.to_string()))
}

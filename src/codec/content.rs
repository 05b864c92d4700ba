use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine as _;

use crate::codec::identity;
use crate::codec::payload::{PayloadReader, PayloadWriter};
use crate::entities::item::{ItemInstance, Slot, StackEntry};

/// Tag key carrying the serialized slot sequence.
pub const CONTENT_TAG_KEY: &str = "backpack:contents";

/// Version byte leading every content payload.
pub const CONTENT_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Stored slot count differs from the item's declared capacity. A
    /// data-integrity fault, never silently truncated or padded.
    LengthMismatch { stored: usize, expected: usize },
    /// Structurally invalid payload: bad armor, unknown version, truncated
    /// fields, trailing bytes.
    Malformed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::LengthMismatch { stored, expected } => write!(
                f,
                "content length {} does not match declared capacity {}",
                stored, expected
            ),
            DecodeError::Malformed(detail) => write!(f, "malformed content payload: {}", detail),
        }
    }
}

/// Serializes a slot sequence to the base64-armored tag text. Empty slots
/// are a single marker byte; metadata blobs pass through uninterpreted.
pub fn encode(slots: &[Slot]) -> String {
    let mut writer = PayloadWriter::new();
    writer.write_u8(CONTENT_VERSION);
    writer.write_u16_le(slots.len() as u16);
    for slot in slots {
        match slot {
            None => writer.write_u8(0),
            Some(entry) => {
                writer.write_u8(1);
                writer.write_string(&entry.type_key);
                writer.write_u32_le(entry.quantity);
                writer.write_blob(&entry.metadata);
            }
        }
    }
    BASE64_ENGINE.encode(writer.as_slice())
}

/// Encodes and stores the slot sequence under the content tag.
pub fn write_to_item(item: &mut ItemInstance, slots: &[Slot]) {
    item.tags.set(CONTENT_TAG_KEY, encode(slots));
}

/// Reconstructs the slot sequence from the item's content tag. An item
/// that was stamped but never opened has no content tag and yields an
/// all-empty sequence of the declared capacity.
pub fn decode(item: &ItemInstance) -> Result<Vec<Slot>, DecodeError> {
    let capacity = identity::read_capacity(item)
        .map_err(|_| DecodeError::Malformed("identity tag missing or unreadable".to_string()))?;
    let Some(text) = item.tags.get(CONTENT_TAG_KEY) else {
        return Ok(vec![None; capacity as usize]);
    };
    decode_payload(text, capacity as usize)
}

/// Decodes a raw content tag value against a known capacity.
pub fn decode_payload(text: &str, expected: usize) -> Result<Vec<Slot>, DecodeError> {
    let bytes = BASE64_ENGINE
        .decode(text)
        .map_err(|_| DecodeError::Malformed("content tag is not valid base64".to_string()))?;
    let mut reader = PayloadReader::new(&bytes);

    let version = reader
        .read_u8()
        .ok_or_else(|| DecodeError::Malformed("missing version byte".to_string()))?;
    if version != CONTENT_VERSION {
        return Err(DecodeError::Malformed(format!(
            "unsupported content version {}",
            version
        )));
    }

    let stored = reader
        .read_u16_le()
        .ok_or_else(|| DecodeError::Malformed("missing slot count".to_string()))?
        as usize;
    if stored != expected {
        return Err(DecodeError::LengthMismatch { stored, expected });
    }

    let mut slots = Vec::with_capacity(stored);
    for index in 0..stored {
        let present = reader
            .read_u8()
            .ok_or_else(|| DecodeError::Malformed(format!("slot {} truncated", index)))?;
        match present {
            0 => slots.push(None),
            1 => {
                let type_key = reader.read_string().ok_or_else(|| {
                    DecodeError::Malformed(format!("slot {} has invalid type key", index))
                })?;
                let quantity = reader.read_u32_le().ok_or_else(|| {
                    DecodeError::Malformed(format!("slot {} truncated quantity", index))
                })?;
                if quantity == 0 {
                    return Err(DecodeError::Malformed(format!(
                        "slot {} has zero quantity",
                        index
                    )));
                }
                let metadata = reader.read_blob().ok_or_else(|| {
                    DecodeError::Malformed(format!("slot {} truncated metadata", index))
                })?;
                slots.push(Some(StackEntry {
                    type_key,
                    quantity,
                    metadata,
                }));
            }
            other => {
                return Err(DecodeError::Malformed(format!(
                    "slot {} has invalid presence byte {}",
                    index, other
                )))
            }
        }
    }

    if reader.remaining() != 0 {
        return Err(DecodeError::Malformed(
            "trailing bytes after slot data".to_string(),
        ));
    }
    Ok(slots)
}

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine as _;

use crate::codec::payload::{PayloadReader, PayloadWriter};
use crate::entities::item::{ItemInstance, StackEntry};
use crate::entities::tags::TagStore;

/// Tag key carrying the container marker, visual key and declared capacity.
pub const IDENTITY_TAG_KEY: &str = "backpack:identity";

/// First byte of every identity payload.
const IDENTITY_MARKER: u8 = 0xb5;

/// Slots per capacity unit (one inventory row).
pub const SLOT_UNIT: u8 = 9;

/// Largest allowed capacity in units.
pub const MAX_UNITS: u8 = 6;

/// What makes an item a container: its cosmetic name, the opaque token
/// selecting its external appearance, and the slot count stamped onto it.
/// Capacity is immutable once stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerIdentity {
    pub cosmetic_name: String,
    pub visual_key: String,
    pub capacity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    NotAContainer,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::NotAContainer => write!(f, "item is not a container"),
        }
    }
}

/// Writes the identity tag onto the item, overwriting any previous tag, and
/// applies the cosmetic name. Factory-only; runtime code never re-stamps.
pub fn stamp(item: &mut ItemInstance, identity: &ContainerIdentity) {
    let mut writer = PayloadWriter::new();
    writer.write_u8(IDENTITY_MARKER);
    writer.write_string(&identity.visual_key);
    writer.write_u8(identity.capacity);
    item.tags
        .set(IDENTITY_TAG_KEY, BASE64_ENGINE.encode(writer.as_slice()));
    item.display_name = identity.cosmetic_name.clone();
}

fn parse_identity_tag(value: &str) -> Option<(String, u8)> {
    let bytes = BASE64_ENGINE.decode(value).ok()?;
    let mut reader = PayloadReader::new(&bytes);
    if reader.read_u8()? != IDENTITY_MARKER {
        return None;
    }
    let visual_key = reader.read_string()?;
    let capacity = reader.read_u8()?;
    if capacity == 0 || reader.remaining() != 0 {
        return None;
    }
    Some((visual_key, capacity))
}

/// Pure predicate used pervasively as a safety guard: true iff the identity
/// tag is present and well-formed. Absent items, absent tags and malformed
/// tags all answer false; this never fails.
pub fn is_container(item: Option<&ItemInstance>) -> bool {
    item.and_then(|item| item.tags.get(IDENTITY_TAG_KEY))
        .and_then(parse_identity_tag)
        .is_some()
}

/// Same predicate evaluated against a stack's metadata snapshot. Every
/// mutation-surface guard funnels through this form: a container inside an
/// inventory is a stack whose snapshot still carries the identity tag.
pub fn is_container_stack(stack: &StackEntry) -> bool {
    TagStore::from_bytes(&stack.metadata)
        .as_ref()
        .and_then(|tags| tags.get(IDENTITY_TAG_KEY))
        .and_then(parse_identity_tag)
        .is_some()
}

pub fn read_identity(item: &ItemInstance) -> Result<ContainerIdentity, IdentityError> {
    let (visual_key, capacity) = item
        .tags
        .get(IDENTITY_TAG_KEY)
        .and_then(parse_identity_tag)
        .ok_or(IdentityError::NotAContainer)?;
    Ok(ContainerIdentity {
        cosmetic_name: item.display_name.clone(),
        visual_key,
        capacity,
    })
}

pub fn read_capacity(item: &ItemInstance) -> Result<u8, IdentityError> {
    read_identity(item).map(|identity| identity.capacity)
}

use std::fmt;

use crate::codec::content;
use crate::codec::identity::{self, ContainerIdentity, MAX_UNITS, SLOT_UNIT};
use crate::config::BackpackTemplate;
use crate::entities::item::ItemInstance;

/// Host type key for container items; their appearance comes from the
/// visual key stamped into the identity tag.
pub const CONTAINER_TYPE_KEY: &str = "player_head";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryError {
    InvalidCapacity { requested: u16 },
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::InvalidCapacity { requested } => write!(
                f,
                "invalid capacity {}: must be a positive multiple of {} up to {}",
                requested,
                SLOT_UNIT,
                SLOT_UNIT as u16 * MAX_UNITS as u16
            ),
        }
    }
}

/// Builds a fresh container item: stamps the identity tag and writes an
/// all-empty content payload of the requested capacity.
pub fn create(
    cosmetic_name: &str,
    visual_key: &str,
    capacity: u16,
) -> Result<ItemInstance, FactoryError> {
    let max = SLOT_UNIT as u16 * MAX_UNITS as u16;
    if capacity == 0 || capacity % SLOT_UNIT as u16 != 0 || capacity > max {
        return Err(FactoryError::InvalidCapacity {
            requested: capacity,
        });
    }

    let mut item = ItemInstance::new(CONTAINER_TYPE_KEY);
    identity::stamp(
        &mut item,
        &ContainerIdentity {
            cosmetic_name: cosmetic_name.to_string(),
            visual_key: visual_key.to_string(),
            capacity: capacity as u8,
        },
    );
    content::write_to_item(&mut item, &vec![None; capacity as usize]);
    Ok(item)
}

/// Template-driven creation used by host give commands and the validation
/// binary.
pub fn create_from_template(template: &BackpackTemplate) -> Result<ItemInstance, FactoryError> {
    create(&template.name, &template.visual_key, template.capacity())
}

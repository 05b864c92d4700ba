use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::entities::tags::TagStore;

/// Host-side identity of an actor (player) interacting with items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u64);

/// Process-unique identity of one item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u32);

static NEXT_ITEM_ID: AtomicU32 = AtomicU32::new(1);

impl ItemId {
    pub fn next() -> Self {
        let id = NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed);
        ItemId(id)
    }

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

/// One item instance as the host hands it to this crate: a type key, a
/// display name, and the string-tag metadata region the codecs write into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInstance {
    pub id: ItemId,
    pub type_key: String,
    pub display_name: String,
    pub tags: TagStore,
}

impl ItemInstance {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self {
            id: ItemId::next(),
            type_key: type_key.into(),
            display_name: String::new(),
            tags: TagStore::new(),
        }
    }

    pub fn into_handle(self) -> ItemHandle {
        Arc::new(Mutex::new(self))
    }
}

/// Shared handle through which the host and the session registry reach the
/// same item instance.
pub type ItemHandle = Arc<Mutex<ItemInstance>>;

/// A quantity of one item type plus opaque per-stack metadata. The metadata
/// blob passes through the content codec untouched; for items with tags it
/// is the tag-store snapshot taken when the item entered an inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub type_key: String,
    pub quantity: u32,
    pub metadata: Vec<u8>,
}

impl StackEntry {
    pub fn new(type_key: impl Into<String>, quantity: u32) -> Self {
        Self {
            type_key: type_key.into(),
            quantity,
            metadata: Vec::new(),
        }
    }

    /// Snapshot of an item as it appears when placed into an inventory
    /// slot. The item's tags ride along in the metadata blob, which is how
    /// container-ness stays detectable inside a stack.
    pub fn from_item(item: &ItemInstance) -> Self {
        Self {
            type_key: item.type_key.clone(),
            quantity: 1,
            metadata: item.tags.to_bytes(),
        }
    }
}

/// One addressable position in a container's content sequence.
pub type Slot = Option<StackEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_are_unique() {
        let first = ItemInstance::new("apple");
        let second = ItemInstance::new("apple");
        assert_ne!(first.id, second.id);
        assert!(first.id.is_assigned());
    }

    #[test]
    fn stack_from_item_carries_tags() {
        let mut item = ItemInstance::new("player_head");
        item.tags.set("backpack:identity", "opaque");

        let stack = StackEntry::from_item(&item);
        assert_eq!(stack.type_key, "player_head");
        assert_eq!(stack.quantity, 1);

        let parsed = TagStore::from_bytes(&stack.metadata).expect("snapshot");
        assert_eq!(parsed.get("backpack:identity"), Some("opaque"));
    }

    #[test]
    fn stack_from_plain_item_has_empty_tag_snapshot() {
        let item = ItemInstance::new("apple");
        let stack = StackEntry::from_item(&item);
        let parsed = TagStore::from_bytes(&stack.metadata).expect("snapshot");
        assert!(parsed.is_empty());
    }
}

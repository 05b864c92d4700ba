use std::num::NonZeroUsize;

use lru::LruCache;
use sha1::{Digest, Sha1};

use crate::codec::content::{self, DecodeError};
use crate::codec::identity::IDENTITY_TAG_KEY;
use crate::entities::item::ItemInstance;

/// Read-only summary of a container's contents, cheap enough for tooltips
/// and admin audits without opening a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSummary {
    pub capacity: u8,
    pub occupied: usize,
    pub total_quantity: u64,
}

/// Digest of an item's raw identity + content tag text. Two items with the
/// same stamped identity and the same payload share a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadDigest([u8; 20]);

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64) / (total as f64)
        }
    }
}

/// Summary cache with LRU eviction.
pub struct PreviewCache {
    cache: LruCache<PayloadDigest, ContentSummary>,
    stats: CacheStats,
}

impl PreviewCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        PreviewCache {
            cache: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Summarizes the item's contents, decoding on a cache miss. Never
    /// touches session state or live views.
    pub fn summarize(&mut self, item: &ItemInstance) -> Result<ContentSummary, DecodeError> {
        let digest = payload_digest(item);
        if let Some(summary) = self.cache.get(&digest) {
            self.stats.hits += 1;
            return Ok(*summary);
        }

        self.stats.misses += 1;
        let slots = content::decode(item)?;
        let summary = ContentSummary {
            capacity: slots.len() as u8,
            occupied: slots.iter().filter(|slot| slot.is_some()).count(),
            total_quantity: slots
                .iter()
                .filter_map(|slot| slot.as_ref())
                .map(|entry| entry.quantity as u64)
                .sum(),
        };

        if self.cache.len() == self.cache.cap().get() {
            self.stats.evictions += 1;
        }
        self.cache.put(digest, summary);
        Ok(summary)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

fn payload_digest(item: &ItemInstance) -> PayloadDigest {
    let mut sha1 = Sha1::new();
    sha1.update(item.tags.get(IDENTITY_TAG_KEY).unwrap_or("").as_bytes());
    sha1.update([0x00]);
    sha1.update(
        item.tags
            .get(content::CONTENT_TAG_KEY)
            .unwrap_or("")
            .as_bytes(),
    );
    PayloadDigest(sha1.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::content::write_to_item;
    use crate::entities::item::{Slot, StackEntry};
    use crate::factory;

    fn filled_container() -> ItemInstance {
        let mut item = factory::create("Backpack", "hdb:3310", 9).expect("create");
        let mut slots: Vec<Slot> = vec![None; 9];
        slots[0] = Some(StackEntry::new("stone", 64));
        slots[3] = Some(StackEntry::new("arrow", 12));
        write_to_item(&mut item, &slots);
        item
    }

    #[test]
    fn summarize_counts_occupied_slots() {
        let mut cache = PreviewCache::new(8);
        let summary = cache.summarize(&filled_container()).expect("summary");
        assert_eq!(summary.capacity, 9);
        assert_eq!(summary.occupied, 2);
        assert_eq!(summary.total_quantity, 76);
    }

    #[test]
    fn unchanged_item_hits_cache() {
        let mut cache = PreviewCache::new(8);
        let item = filled_container();
        cache.summarize(&item).expect("first");
        cache.summarize(&item).expect("second");
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn changed_payload_misses_cache() {
        let mut cache = PreviewCache::new(8);
        let mut item = filled_container();
        cache.summarize(&item).expect("first");

        let mut slots: Vec<Slot> = vec![None; 9];
        slots[8] = Some(StackEntry::new("feather", 3));
        write_to_item(&mut item, &slots);

        let summary = cache.summarize(&item).expect("second");
        assert_eq!(summary.occupied, 1);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn bounded_cache_evicts() {
        let mut cache = PreviewCache::new(1);
        let first = filled_container();
        let second = factory::create("Satchel", "hdb:41", 9).expect("create");
        cache.summarize(&first).expect("first");
        cache.summarize(&second).expect("second");
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn plain_item_fails_summary() {
        let mut cache = PreviewCache::new(8);
        let item = ItemInstance::new("apple");
        assert!(cache.summarize(&item).is_err());
    }
}

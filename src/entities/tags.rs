use std::collections::BTreeMap;

use crate::codec::payload::{PayloadReader, PayloadWriter};

/// String-keyed metadata region attached to an item instance. The host
/// exposes item metadata as string tags; binary payloads are armored into
/// it by the codecs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStore {
    entries: BTreeMap<String, String>,
}

impl TagStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|value| value.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deterministic byte snapshot of the whole store. Used when an item is
    /// represented as a stack inside another inventory; the snapshot is the
    /// stack's metadata blob. Entries are emitted in key order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = PayloadWriter::new();
        writer.write_u16_le(self.entries.len() as u16);
        for (key, value) in &self.entries {
            writer.write_string(key);
            writer.write_string(value);
        }
        writer.into_vec()
    }

    /// Parses a snapshot produced by `to_bytes`. Returns `None` on any
    /// structural fault; callers probing foreign blobs treat that as
    /// "not a tag snapshot".
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let mut reader = PayloadReader::new(data);
        let count = reader.read_u16_le()?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key = reader.read_string()?;
            let value = reader.read_string()?;
            entries.insert(key, value);
        }
        if reader.remaining() != 0 {
            return None;
        }
        Some(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_roundtrip() {
        let mut tags = TagStore::new();
        tags.set("backpack:identity", "abc123");
        tags.set("owner", "Avatar");

        let bytes = tags.to_bytes();
        let parsed = TagStore::from_bytes(&bytes).expect("snapshot parse");
        assert_eq!(parsed, tags);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let mut first = TagStore::new();
        first.set("b", "2");
        first.set("a", "1");

        let mut second = TagStore::new();
        second.set("a", "1");
        second.set("b", "2");

        assert_eq!(first.to_bytes(), second.to_bytes());
    }

    #[test]
    fn empty_snapshot_roundtrip() {
        let tags = TagStore::new();
        let parsed = TagStore::from_bytes(&tags.to_bytes()).expect("empty parse");
        assert!(parsed.is_empty());
    }

    #[test]
    fn truncated_snapshot_rejected() {
        let mut tags = TagStore::new();
        tags.set("key", "value");
        let mut bytes = tags.to_bytes();
        bytes.truncate(bytes.len() - 1);
        assert!(TagStore::from_bytes(&bytes).is_none());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut tags = TagStore::new();
        tags.set("key", "value");
        let mut bytes = tags.to_bytes();
        bytes.push(0x00);
        assert!(TagStore::from_bytes(&bytes).is_none());
    }

    #[test]
    fn arbitrary_blob_rejected() {
        assert!(TagStore::from_bytes(&[0xde, 0xad, 0xbe]).is_none());
    }
}

//! Ordered key-value store and its write overlay
//!
//! Reads take `&self`, writes take `&mut self`. Validation code is handed a
//! shared reference and therefore cannot mutate the store.
//!
//! `CacheWrap` buffers writes over a parent store. A transition runs inside
//! one; on success its writes become a `Batch` applied to the parent, on
//! failure the overlay is dropped and the parent is untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

/// A key/value pair returned by range scans
pub type Entry = (Vec<u8>, Vec<u8>);

/// Ordered byte-keyed store
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Entries with `start <= key < end`, ascending. `None` end is unbounded.
    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Vec<Entry>;

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// Smallest key greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty or all-0xff prefix).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// All entries whose key starts with `prefix`, ascending
pub fn scan_prefix(store: &dyn KvStore, prefix: &[u8]) -> Vec<Entry> {
    let end = prefix_end(prefix);
    store.range(prefix, end.as_deref())
}

fn bounds<'a>(start: &'a [u8], end: Option<&'a [u8]>) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    let upper = match end {
        Some(e) => Bound::Excluded(e),
        None => Bound::Unbounded,
    };
    (Bound::Included(start), upper)
}

/// In-memory ordered store
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Vec<Entry> {
        if matches!(end, Some(e) if e <= start) {
            return Vec::new();
        }
        self.data
            .range::<[u8], _>(bounds(start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.data.insert(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.data.remove(key);
    }
}

/// A single buffered mutation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Set {
        #[serde(with = "hex_bytes")]
        key: Vec<u8>,
        #[serde(with = "hex_bytes")]
        value: Vec<u8>,
    },
    Delete {
        #[serde(with = "hex_bytes")]
        key: Vec<u8>,
    },
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Set { key, value } => write!(
                f,
                "Set({}, {} bytes)",
                String::from_utf8_lossy(key),
                value.len()
            ),
            Op::Delete { key } => write!(f, "Delete({})", String::from_utf8_lossy(key)),
        }
    }
}

/// Ordered set of mutations committed together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub ops: Vec<Op>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Apply every op in order
    pub fn apply(&self, store: &mut dyn KvStore) {
        for op in &self.ops {
            match op {
                Op::Set { key, value } => store.set(key.clone(), value.clone()),
                Op::Delete { key } => store.delete(key),
            }
        }
    }
}

/// Write-buffering overlay over a read-only parent
pub struct CacheWrap<'a> {
    parent: &'a dyn KvStore,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> CacheWrap<'a> {
    pub fn new(parent: &'a dyn KvStore) -> Self {
        Self {
            parent,
            pending: BTreeMap::new(),
        }
    }

    /// Buffered writes as a batch, in key order
    pub fn into_batch(self) -> Batch {
        let ops = self
            .pending
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => Op::Set { key, value },
                None => Op::Delete { key },
            })
            .collect();
        Batch { ops }
    }

    /// Drop all buffered writes
    pub fn discard(&mut self) {
        self.pending.clear();
    }
}

impl KvStore for CacheWrap<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(value) => value.clone(),
            None => self.parent.get(key),
        }
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Vec<Entry> {
        if matches!(end, Some(e) if e <= start) {
            return Vec::new();
        }
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.range(start, end).into_iter().collect();
        for (key, value) in self.pending.range::<[u8], _>(bounds(start, end)) {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.pending.insert(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), None);
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemStore {
        let mut store = MemStore::new();
        store.set(b"a:1".to_vec(), b"one".to_vec());
        store.set(b"a:2".to_vec(), b"two".to_vec());
        store.set(b"b:1".to_vec(), b"other".to_vec());
        store
    }

    #[test]
    fn test_prefix_end() {
        assert_eq!(prefix_end(b"a:"), Some(b"a;".to_vec()));
        assert_eq!(prefix_end(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
        assert_eq!(prefix_end(b""), None);
    }

    #[test]
    fn test_scan_prefix_ordered() {
        let store = seeded();
        let keys: Vec<_> = scan_prefix(&store, b"a:").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a:1".to_vec(), b"a:2".to_vec()]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let store = seeded();
        assert!(store.range(b"b", Some(b"a")).is_empty());
    }

    #[test]
    fn test_cache_wrap_overlays_parent() {
        let store = seeded();
        let mut cache = CacheWrap::new(&store);
        cache.delete(b"a:1");
        cache.set(b"a:3".to_vec(), b"three".to_vec());

        assert_eq!(cache.get(b"a:1"), None);
        assert_eq!(cache.get(b"a:2"), Some(b"two".to_vec()));
        let keys: Vec<_> = scan_prefix(&cache, b"a:").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a:2".to_vec(), b"a:3".to_vec()]);

        // parent untouched until the batch is applied
        assert_eq!(store.get(b"a:1"), Some(b"one".to_vec()));
    }

    #[test]
    fn test_batch_apply_commits_overlay() {
        let mut store = seeded();
        let batch = {
            let mut cache = CacheWrap::new(&store);
            cache.delete(b"a:1");
            cache.set(b"c:1".to_vec(), b"new".to_vec());
            cache.into_batch()
        };
        assert_eq!(batch.len(), 2);
        batch.apply(&mut store);
        assert!(!store.has(b"a:1"));
        assert_eq!(store.get(b"c:1"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_discard_drops_writes() {
        let store = seeded();
        let mut cache = CacheWrap::new(&store);
        cache.set(b"z".to_vec(), b"tmp".to_vec());
        cache.discard();
        assert!(cache.into_batch().is_empty());
    }

    #[test]
    fn test_op_serializes_as_hex() {
        let op = Op::Set {
            key: b"k".to_vec(),
            value: vec![0xab],
        };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"op":"set","key":"6b","value":"ab"}"#);
        let back: Op = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}

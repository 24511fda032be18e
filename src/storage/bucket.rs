//! Record buckets
//!
//! A bucket persists one record kind under sequential ids and keeps its
//! registered secondary indexes in step with every save and delete.
//!
//! Key layout:
//!
//! ```text
//! <bucket>:<id BE64>                -> JSON Record
//! _s.<bucket>                       -> last assigned id (u64 BE)
//! _i.<bucket>_<index>:<value>       -> JSON sorted id list
//! ```
//!
//! All index values for a write are computed before anything is written,
//! so an index builder failure leaves the store untouched.

use crate::errors::{LedgerError, LedgerResult};
use crate::index::{IndexEntry, IndexError, Indexer};
use crate::model::{Object, Record, RecordId, RecordKind};

use super::kv::{prefix_end, scan_prefix, KvStore};

struct IndexSpec {
    name: &'static str,
    indexer: Indexer,
}

/// Typed collection of records plus its indexes
pub struct Bucket {
    name: &'static str,
    kind: RecordKind,
    indexes: Vec<IndexSpec>,
}

/// A pending index rewrite: (index position, old value, new value)
type IndexChange = (usize, Option<Vec<u8>>, Option<Vec<u8>>);

impl Bucket {
    pub fn new(name: &'static str, kind: RecordKind) -> Self {
        Self {
            name,
            kind,
            indexes: Vec::new(),
        }
    }

    /// Register a secondary index
    pub fn with_index(mut self, name: &'static str, indexer: Indexer) -> Self {
        self.indexes.push(IndexSpec { name, indexer });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn index_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indexes.iter().map(|i| i.name)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.iter().any(|i| i.name == name)
    }

    fn record_prefix(&self) -> Vec<u8> {
        format!("{}:", self.name).into_bytes()
    }

    fn record_key(&self, id: RecordId) -> Vec<u8> {
        let mut key = self.record_prefix();
        key.extend_from_slice(&id.to_key());
        key
    }

    fn sequence_key(&self) -> Vec<u8> {
        format!("_s.{}", self.name).into_bytes()
    }

    fn index_prefix(&self, index: &str) -> Vec<u8> {
        format!("_i.{}_{}:", self.name, index).into_bytes()
    }

    fn index_key(&self, index: &str, value: &[u8]) -> Vec<u8> {
        let mut key = self.index_prefix(index);
        key.extend_from_slice(value);
        key
    }

    fn check_kind(&self, record: &Record) -> LedgerResult<()> {
        if record.kind() != self.kind {
            return Err(LedgerError::consistency(format!(
                "bucket {} holds {} records, got {}",
                self.name,
                self.kind,
                record.kind()
            )));
        }
        Ok(())
    }

    fn index_spec(&self, index: &str) -> LedgerResult<&IndexSpec> {
        self.indexes.iter().find(|i| i.name == index).ok_or_else(|| {
            LedgerError::consistency(format!("bucket {} has no index {}", self.name, index))
        })
    }

    /// Id the next `create` would assign; does not advance the sequence
    pub fn peek_next_id(&self, store: &dyn KvStore) -> LedgerResult<RecordId> {
        let last = match store.get(&self.sequence_key()) {
            Some(raw) => RecordId::from_key(&raw)?.value(),
            None => 0,
        };
        Ok(RecordId::new(last + 1))
    }

    fn next_id(&self, store: &mut dyn KvStore) -> LedgerResult<RecordId> {
        let id = self.peek_next_id(&*store)?;
        store.set(self.sequence_key(), id.to_key().to_vec());
        Ok(id)
    }

    /// Store a new record under a freshly assigned id
    pub fn create(&self, store: &mut dyn KvStore, record: &Record) -> LedgerResult<RecordId> {
        self.check_kind(record)?;
        record.validate()?;
        // index values are computed against a placeholder id so nothing is
        // consumed from the sequence when a builder rejects the record
        self.changes(RecordId::new(0), None, record)?;
        let id = self.next_id(store)?;
        self.save(store, id, record)?;
        Ok(id)
    }

    /// Insert or replace the record at `id`, updating every index
    pub fn save(&self, store: &mut dyn KvStore, id: RecordId, record: &Record) -> LedgerResult<()> {
        self.check_kind(record)?;
        record.validate()?;

        let old = self.get(&*store, id)?;
        let changes = self.changes(id, old.as_ref(), record)?;

        store.set(self.record_key(id), serde_json::to_vec(record)?);
        self.apply_changes(store, id, changes)
    }

    fn changes(
        &self,
        id: RecordId,
        old: Option<&Record>,
        new: &Record,
    ) -> LedgerResult<Vec<IndexChange>> {
        let old_obj = old.map(|r| Object::new(id, r));
        let new_obj = Object::new(id, new);

        let mut changes = Vec::new();
        for (pos, spec) in self.indexes.iter().enumerate() {
            let old_value = (spec.indexer)(old_obj.as_ref())?;
            let new_value = (spec.indexer)(Some(&new_obj))?;
            if old_value != new_value {
                changes.push((pos, old_value, new_value));
            }
        }
        Ok(changes)
    }

    fn apply_changes(
        &self,
        store: &mut dyn KvStore,
        id: RecordId,
        changes: Vec<IndexChange>,
    ) -> LedgerResult<()> {
        for (pos, old_value, new_value) in changes {
            let name = self.indexes[pos].name;
            if let Some(value) = old_value {
                self.remove_ref(store, name, &value, id)?;
            }
            if let Some(value) = new_value {
                self.add_ref(store, name, &value, id)?;
            }
        }
        Ok(())
    }

    fn load_entry(&self, store: &dyn KvStore, key: &[u8]) -> LedgerResult<IndexEntry> {
        match store.get(key) {
            Some(raw) => Ok(serde_json::from_slice(&raw)?),
            None => Ok(IndexEntry::new()),
        }
    }

    fn add_ref(&self, store: &mut dyn KvStore, index: &str, value: &[u8], id: RecordId) -> LedgerResult<()> {
        let key = self.index_key(index, value);
        let mut entry = self.load_entry(&*store, &key)?;
        entry.insert(id);
        store.set(key, serde_json::to_vec(&entry)?);
        Ok(())
    }

    fn remove_ref(&self, store: &mut dyn KvStore, index: &str, value: &[u8], id: RecordId) -> LedgerResult<()> {
        let key = self.index_key(index, value);
        let mut entry = self.load_entry(&*store, &key)?;
        if !entry.remove(id) {
            return Err(IndexError::drift(format!(
                "{}_{} entry does not reference {} {}",
                self.name, index, self.kind, id
            ))
            .into());
        }
        if entry.is_empty() {
            store.delete(&key);
        } else {
            store.set(key, serde_json::to_vec(&entry)?);
        }
        Ok(())
    }

    /// Load a record, `None` when absent
    pub fn get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Option<Record>> {
        let Some(raw) = store.get(&self.record_key(id)) else {
            return Ok(None);
        };
        let record: Record = serde_json::from_slice(&raw)?;
        self.check_kind(&record)?;
        Ok(Some(record))
    }

    /// Load a record or fail with NotFound
    pub fn must_get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Record> {
        self.get(store, id)?
            .ok_or_else(|| LedgerError::not_found(format!("{} {} does not exist", self.kind, id)))
    }

    pub fn exists(&self, store: &dyn KvStore, id: RecordId) -> bool {
        store.has(&self.record_key(id))
    }

    /// Remove a record and its index entries; NotFound when absent
    pub fn delete(&self, store: &mut dyn KvStore, id: RecordId) -> LedgerResult<()> {
        let old = self.must_get(&*store, id)?;
        let old_obj = Object::new(id, &old);

        let mut removals = Vec::new();
        for spec in &self.indexes {
            if let Some(value) = (spec.indexer)(Some(&old_obj))? {
                removals.push((spec.name, value));
            }
        }

        store.delete(&self.record_key(id));
        for (name, value) in removals {
            self.remove_ref(store, name, &value, id)?;
        }
        Ok(())
    }

    /// Ids whose index value equals `value`, ascending
    pub fn by_index(&self, store: &dyn KvStore, index: &str, value: &[u8]) -> LedgerResult<Vec<RecordId>> {
        let spec = self.index_spec(index)?;
        let entry = self.load_entry(store, &self.index_key(spec.name, value))?;
        Ok(entry.into_ids())
    }

    /// Ids whose index value starts with `prefix`, in index value order
    pub fn by_index_prefix(&self, store: &dyn KvStore, index: &str, prefix: &[u8]) -> LedgerResult<Vec<RecordId>> {
        let spec = self.index_spec(index)?;
        let entries = scan_prefix(store, &self.index_key(spec.name, prefix));
        self.collect_ids(entries)
    }

    /// Ids whose index value lies in `[start, end)`, in index value order.
    /// A `None` end runs to the last value of the index.
    pub fn by_index_range(
        &self,
        store: &dyn KvStore,
        index: &str,
        start: &[u8],
        end: Option<&[u8]>,
    ) -> LedgerResult<Vec<RecordId>> {
        let spec = self.index_spec(index)?;
        let start_key = self.index_key(spec.name, start);
        let end_key = match end {
            Some(e) => Some(self.index_key(spec.name, e)),
            None => prefix_end(&self.index_prefix(spec.name)),
        };
        let entries = store.range(&start_key, end_key.as_deref());
        self.collect_ids(entries)
    }

    fn collect_ids(&self, entries: Vec<(Vec<u8>, Vec<u8>)>) -> LedgerResult<Vec<RecordId>> {
        let mut ids = Vec::new();
        for (_, raw) in entries {
            let entry: IndexEntry = serde_json::from_slice(&raw)?;
            ids.extend(entry.into_ids());
        }
        Ok(ids)
    }

    /// Load records for ids; a referenced id without a record is index drift
    pub fn load_all(&self, store: &dyn KvStore, ids: &[RecordId]) -> LedgerResult<Vec<(RecordId, Record)>> {
        ids.iter()
            .map(|&id| -> LedgerResult<(RecordId, Record)> {
                self.get(store, id)?
                    .map(|r| (id, r))
                    .ok_or_else(|| IndexError::drift(format!("index references missing {} {}", self.kind, id)).into())
            })
            .collect()
    }

    /// Every record whose id key starts with `prefix` (empty prefix = all)
    pub fn scan(&self, store: &dyn KvStore, prefix: &[u8]) -> LedgerResult<Vec<(RecordId, Record)>> {
        let mut key_prefix = self.record_prefix();
        let skip = key_prefix.len();
        key_prefix.extend_from_slice(prefix);

        scan_prefix(store, &key_prefix)
            .into_iter()
            .map(|(key, raw)| -> LedgerResult<(RecordId, Record)> {
                let id = RecordId::from_key(&key[skip..])?;
                let record: Record = serde_json::from_slice(&raw)?;
                self.check_kind(&record)?;
                Ok((id, record))
            })
            .collect()
    }
}

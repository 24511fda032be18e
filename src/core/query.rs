//! Read-only query surface
//!
//! Buckets registered under a name answer two kinds of paths:
//!
//! - `<name>`: `data` is a primary key (8 byte BE id)
//! - `<name>/<index>`: `data` is an index value
//!
//! Exact mode matches `data` in full; prefix mode matches every key or
//! index value starting with `data`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::{LedgerError, LedgerResult};
use crate::model::{Record, RecordId};
use crate::storage::{Bucket, KvStore};

/// How `data` is matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryMode {
    #[default]
    Exact,
    Prefix,
}

impl FromStr for QueryMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "exact" => Ok(QueryMode::Exact),
            "prefix" => Ok(QueryMode::Prefix),
            other => Err(LedgerError::validation(format!("unknown query mode {}", other))),
        }
    }
}

/// One query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryModel {
    /// Hex primary key
    pub key: String,
    pub id: RecordId,
    pub record: Record,
}

impl QueryModel {
    fn new(id: RecordId, record: Record) -> Self {
        Self {
            key: hex::encode(id.to_key()),
            id,
            record,
        }
    }
}

/// Named buckets open for lookup
#[derive(Default)]
pub struct QueryRouter {
    buckets: BTreeMap<&'static str, Bucket>,
}

impl QueryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, bucket: Bucket) -> LedgerResult<()> {
        if self.buckets.contains_key(name) {
            return Err(LedgerError::consistency(format!(
                "query path {} already registered",
                name
            )));
        }
        self.buckets.insert(name, bucket);
        Ok(())
    }

    /// Every answerable path, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, bucket) in &self.buckets {
            paths.push(name.to_string());
            paths.extend(bucket.index_names().map(|index| format!("{}/{}", name, index)));
        }
        paths.sort();
        paths
    }

    pub fn query(
        &self,
        store: &dyn KvStore,
        path: &str,
        data: &[u8],
        mode: QueryMode,
    ) -> LedgerResult<Vec<QueryModel>> {
        let (name, index) = match path.split_once('/') {
            Some((name, index)) => (name, Some(index)),
            None => (path, None),
        };
        let bucket = self
            .buckets
            .get(name)
            .ok_or_else(|| LedgerError::not_found(format!("unknown query path {}", path)))?;

        let records = match index {
            None => match mode {
                QueryMode::Exact => {
                    let id = RecordId::from_key(data)
                        .map_err(|_| LedgerError::validation("primary key must be 8 bytes"))?;
                    bucket.get(store, id)?.map(|r| vec![(id, r)]).unwrap_or_default()
                }
                QueryMode::Prefix => bucket.scan(store, data)?,
            },
            Some(index) => {
                if !bucket.has_index(index) {
                    return Err(LedgerError::not_found(format!("unknown query path {}", path)));
                }
                let ids = match mode {
                    QueryMode::Exact => bucket.by_index(store, index, data)?,
                    QueryMode::Prefix => bucket.by_index_prefix(store, index, data)?,
                };
                bucket.load_all(store, &ids)?
            }
        };

        Ok(records
            .into_iter()
            .map(|(id, record)| QueryModel::new(id, record))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{register_query, BlogBucket};
    use crate::model::{Address, Blog, UnixTime};
    use crate::storage::MemStore;

    fn seeded() -> (QueryRouter, MemStore, RecordId) {
        let mut queries = QueryRouter::new();
        register_query(&mut queries).unwrap();
        let mut store = MemStore::new();
        let id = BlogBucket::new()
            .create(
                &mut store,
                Blog {
                    owner: Address::derive(b"owner"),
                    title: "a blog title".to_string(),
                    description: "a description".to_string(),
                    created_at: UnixTime::from_secs(1),
                },
            )
            .unwrap();
        (queries, store, id)
    }

    #[test]
    fn test_paths_include_indexes() {
        let (queries, _, _) = seeded();
        assert_eq!(
            queries.paths(),
            vec![
                "articles",
                "articles/blog",
                "articles/timed_blog",
                "blogs",
                "blogs/owner",
                "users"
            ]
        );
    }

    #[test]
    fn test_exact_and_prefix_lookups() {
        let (queries, store, id) = seeded();

        let exact = queries.query(&store, "blogs", &id.to_key(), QueryMode::Exact).unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].id, id);
        assert_eq!(exact[0].key, "0000000000000001");

        let all = queries.query(&store, "blogs", &[], QueryMode::Prefix).unwrap();
        assert_eq!(all.len(), 1);

        let owner = Address::derive(b"owner");
        let by_owner = queries
            .query(&store, "blogs/owner", owner.as_bytes(), QueryMode::Exact)
            .unwrap();
        assert_eq!(by_owner[0].id, id);

        let missing = queries
            .query(&store, "blogs", &RecordId::new(9).to_key(), QueryMode::Exact)
            .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_unknown_path() {
        let (queries, store, _) = seeded();
        assert!(queries.query(&store, "comments", &[], QueryMode::Prefix).unwrap_err().is_not_found());
        assert!(queries.query(&store, "blogs/title", &[], QueryMode::Prefix).unwrap_err().is_not_found());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("prefix".parse::<QueryMode>().unwrap(), QueryMode::Prefix);
        assert_eq!("exact".parse::<QueryMode>().unwrap(), QueryMode::Exact);
        assert!("fuzzy".parse::<QueryMode>().is_err());
    }
}

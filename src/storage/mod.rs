//! Record storage for the ledger
//!
//! The ordered key-value store holds the canonical state: records, index
//! entries, sequences and scheduled tasks. Durability comes from the
//! append-only journal, one checksummed record per committed transition.
//!
//! # Design Principles
//!
//! - Reads through `&dyn KvStore`, writes through `&mut dyn KvStore`
//! - Every transition writes into a `CacheWrap`; commit or discard as a whole
//! - Secondary indexes are rewritten by the bucket on each save/delete
//! - Journal records are checksummed; replay halts on corruption

mod bucket;
mod checksum;
mod errors;
mod journal;
mod kv;

pub use bucket::Bucket;
pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use journal::{journal_path, replay, Journal, JournalReader};
pub use kv::{prefix_end, scan_prefix, Batch, CacheWrap, Entry, KvStore, MemStore, Op};

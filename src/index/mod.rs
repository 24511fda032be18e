//! Secondary indexes
//!
//! Indexes are derived state: the bucket recomputes them from the record on
//! every save and delete, inside the same write batch as the record.
//!
//! # Invariants
//!
//! - Builders are pure and deterministic
//! - No payload means no entry
//! - Wrong record type or negative creation time is a consistency error
//! - Entry id lists are sorted ascending

mod builders;
mod entry;
mod errors;

pub use builders::{
    article_blog_indexer, article_timed_indexer, blog_index, blog_owner_indexer, owner_index,
    timed_index, Indexer, BLOG_INDEX, OWNER_INDEX, TIMED_BLOG_INDEX, TIMED_INDEX_LEN,
};
pub use entry::IndexEntry;
pub use errors::{IndexError, IndexErrorCode, IndexResult};

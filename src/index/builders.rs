//! Secondary index builders
//!
//! Pure functions deriving index values from records. Given no object, or
//! an object without payload, a builder yields no entry; this is how the
//! bucket removes entries for deleted records. A record of the wrong type
//! is a caller bug and fails with a type mismatch.

use super::errors::{IndexError, IndexResult};
use crate::model::{Article, Blog, Object, Record};

/// Blogs by owner address
pub const OWNER_INDEX: &str = "owner";
/// Articles by blog id
pub const BLOG_INDEX: &str = "blog";
/// Articles by (blog id, creation time)
pub const TIMED_BLOG_INDEX: &str = "timed_blog";

/// Length of a timed index value: 8 bytes blog id, 8 bytes creation time
pub const TIMED_INDEX_LEN: usize = 16;

/// Signature shared by every index builder
pub type Indexer = fn(Option<&Object<'_>>) -> IndexResult<Option<Vec<u8>>>;

fn payload<'a>(obj: Option<&Object<'a>>) -> Option<&'a Record> {
    obj.and_then(|o| o.value)
}

pub fn owner_index(blog: &Blog) -> Vec<u8> {
    blog.owner.as_bytes().to_vec()
}

pub fn blog_index(article: &Article) -> Vec<u8> {
    article.blog_id.to_key().to_vec()
}

/// `blog_id (8 bytes BE) ‖ created_at (8 bytes BE)`.
///
/// Lexicographic order of these values is (blog, creation time) order, so
/// a prefix scan on the blog id walks its articles oldest first. Negative
/// times would sort after every positive one and are refused.
pub fn timed_index(article: &Article) -> IndexResult<Vec<u8>> {
    let created_at = article.created_at.as_secs();
    if created_at < 0 {
        return Err(IndexError::negative_time(created_at));
    }
    let mut value = Vec::with_capacity(TIMED_INDEX_LEN);
    value.extend_from_slice(&article.blog_id.to_key());
    value.extend_from_slice(&(created_at as u64).to_be_bytes());
    Ok(value)
}

pub fn blog_owner_indexer(obj: Option<&Object<'_>>) -> IndexResult<Option<Vec<u8>>> {
    match payload(obj) {
        None => Ok(None),
        Some(Record::Blog(blog)) => Ok(Some(owner_index(blog))),
        Some(other) => Err(IndexError::type_mismatch("blog", other.kind())),
    }
}

pub fn article_blog_indexer(obj: Option<&Object<'_>>) -> IndexResult<Option<Vec<u8>>> {
    match payload(obj) {
        None => Ok(None),
        Some(Record::Article(article)) => Ok(Some(blog_index(article))),
        Some(other) => Err(IndexError::type_mismatch("article", other.kind())),
    }
}

pub fn article_timed_indexer(obj: Option<&Object<'_>>) -> IndexResult<Option<Vec<u8>>> {
    match payload(obj) {
        None => Ok(None),
        Some(Record::Article(article)) => timed_index(article).map(Some),
        Some(other) => Err(IndexError::type_mismatch("article", other.kind())),
    }
}

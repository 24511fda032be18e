//! Typed buckets for users, blogs and articles

use crate::errors::LedgerResult;
use crate::index::{
    article_blog_indexer, article_timed_indexer, blog_owner_indexer, BLOG_INDEX, OWNER_INDEX,
    TIMED_BLOG_INDEX,
};
use crate::model::{Address, Article, Blog, Record, RecordId, RecordKind, User};
use crate::storage::{Bucket, KvStore};

pub const USER_BUCKET: &str = "user";
pub const BLOG_BUCKET: &str = "blog";
pub const ARTICLE_BUCKET: &str = "article";

pub struct UserBucket {
    inner: Bucket,
}

impl UserBucket {
    pub fn new() -> Self {
        Self {
            inner: Bucket::new(USER_BUCKET, RecordKind::User),
        }
    }

    pub fn into_bucket(self) -> Bucket {
        self.inner
    }

    pub fn create(&self, store: &mut dyn KvStore, user: User) -> LedgerResult<RecordId> {
        self.inner.create(store, &Record::User(user))
    }

    pub fn get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Option<User>> {
        self.inner.get(store, id)?.map(Record::into_user).transpose()
    }

    pub fn must_get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<User> {
        self.inner.must_get(store, id)?.into_user()
    }
}

impl Default for UserBucket {
    fn default() -> Self {
        Self::new()
    }
}

/// Blogs, indexed by owner
pub struct BlogBucket {
    inner: Bucket,
}

impl BlogBucket {
    pub fn new() -> Self {
        Self {
            inner: Bucket::new(BLOG_BUCKET, RecordKind::Blog).with_index(OWNER_INDEX, blog_owner_indexer),
        }
    }

    pub fn into_bucket(self) -> Bucket {
        self.inner
    }

    pub fn create(&self, store: &mut dyn KvStore, blog: Blog) -> LedgerResult<RecordId> {
        self.inner.create(store, &Record::Blog(blog))
    }

    pub fn save(&self, store: &mut dyn KvStore, id: RecordId, blog: Blog) -> LedgerResult<()> {
        self.inner.save(store, id, &Record::Blog(blog))
    }

    pub fn get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Option<Blog>> {
        self.inner.get(store, id)?.map(Record::into_blog).transpose()
    }

    pub fn must_get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Blog> {
        self.inner.must_get(store, id)?.into_blog()
    }

    /// Ids of blogs owned by `owner`, ascending
    pub fn by_owner(&self, store: &dyn KvStore, owner: &Address) -> LedgerResult<Vec<RecordId>> {
        self.inner.by_index(store, OWNER_INDEX, owner.as_bytes())
    }
}

impl Default for BlogBucket {
    fn default() -> Self {
        Self::new()
    }
}

/// Articles, indexed by blog and by (blog, creation time)
pub struct ArticleBucket {
    inner: Bucket,
}

impl ArticleBucket {
    pub fn new() -> Self {
        Self {
            inner: Bucket::new(ARTICLE_BUCKET, RecordKind::Article)
                .with_index(BLOG_INDEX, article_blog_indexer)
                .with_index(TIMED_BLOG_INDEX, article_timed_indexer),
        }
    }

    pub fn into_bucket(self) -> Bucket {
        self.inner
    }

    pub fn create(&self, store: &mut dyn KvStore, article: Article) -> LedgerResult<RecordId> {
        self.inner.create(store, &Record::Article(article))
    }

    pub fn save(&self, store: &mut dyn KvStore, id: RecordId, article: Article) -> LedgerResult<()> {
        self.inner.save(store, id, &Record::Article(article))
    }

    pub fn delete(&self, store: &mut dyn KvStore, id: RecordId) -> LedgerResult<()> {
        self.inner.delete(store, id)
    }

    pub fn get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Option<Article>> {
        self.inner.get(store, id)?.map(Record::into_article).transpose()
    }

    pub fn must_get(&self, store: &dyn KvStore, id: RecordId) -> LedgerResult<Article> {
        self.inner.must_get(store, id)?.into_article()
    }

    /// Ids of articles under `blog`, ascending by id
    pub fn by_blog(&self, store: &dyn KvStore, blog: RecordId) -> LedgerResult<Vec<RecordId>> {
        self.inner.by_index(store, BLOG_INDEX, &blog.to_key())
    }

    /// Ids of articles under `blog` ordered by creation time
    pub fn by_blog_timed(&self, store: &dyn KvStore, blog: RecordId) -> LedgerResult<Vec<RecordId>> {
        self.inner.by_index_prefix(store, TIMED_BLOG_INDEX, &blog.to_key())
    }

    /// Ids of articles under `blog` created in `[from, to)`, oldest first.
    /// Negative bounds are clamped to zero.
    pub fn between(
        &self,
        store: &dyn KvStore,
        blog: RecordId,
        from: i64,
        to: i64,
    ) -> LedgerResult<Vec<RecordId>> {
        if to <= from || to <= 0 {
            return Ok(Vec::new());
        }
        let bound = |t: i64| {
            let mut value = blog.to_key().to_vec();
            value.extend_from_slice(&(t.max(0) as u64).to_be_bytes());
            value
        };
        let (start, end) = (bound(from), bound(to));
        self.inner.by_index_range(store, TIMED_BLOG_INDEX, &start, Some(&end))
    }
}

impl Default for ArticleBucket {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnixTime;
    use crate::storage::MemStore;

    fn article(blog: u64, created_at: i64) -> Article {
        Article {
            blog_id: RecordId::new(blog),
            owner: Address::derive(b"owner"),
            title: "some title".to_string(),
            content: "some content".to_string(),
            created_at: UnixTime::from_secs(created_at),
            delete_at: None,
            delete_task_id: None,
        }
    }

    #[test]
    fn test_between_is_half_open_and_scoped_to_blog() {
        let articles = ArticleBucket::new();
        let mut store = MemStore::new();
        let a = articles.create(&mut store, article(1, 100)).unwrap();
        let b = articles.create(&mut store, article(1, 200)).unwrap();
        let c = articles.create(&mut store, article(1, 300)).unwrap();
        articles.create(&mut store, article(2, 150)).unwrap();

        assert_eq!(articles.between(&store, RecordId::new(1), 100, 300).unwrap(), vec![a, b]);
        assert_eq!(articles.between(&store, RecordId::new(1), 0, i64::MAX).unwrap(), vec![a, b, c]);
        assert!(articles.between(&store, RecordId::new(1), 300, 100).unwrap().is_empty());
    }

    #[test]
    fn test_buckets_have_separate_key_spaces() {
        let blogs = BlogBucket::new();
        let mut store = MemStore::new();
        let user = UserBucket::new();
        let id = user
            .create(
                &mut store,
                User {
                    username: "someone".to_string(),
                    bio: None,
                    registered_at: UnixTime::from_secs(1),
                },
            )
            .unwrap();
        assert_eq!(blogs.get(&store, id).unwrap(), None);
    }

    #[test]
    fn test_blogs_by_owner() {
        let blogs = BlogBucket::new();
        let mut store = MemStore::new();
        let owner = Address::derive(b"owner");
        let blog = Blog {
            owner,
            title: "a blog title".to_string(),
            description: "a description".to_string(),
            created_at: UnixTime::from_secs(1),
        };
        let first = blogs.create(&mut store, blog.clone()).unwrap();
        let second = blogs.create(&mut store, blog).unwrap();
        assert_eq!(blogs.by_owner(&store, &owner).unwrap(), vec![first, second]);
        assert!(blogs.by_owner(&store, &Address::derive(b"x")).unwrap().is_empty());
    }
}

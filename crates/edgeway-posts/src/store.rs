use std::collections::BTreeMap;

use edgeway_common::{AnimalPost, NewPost, UpdatePost};
use tokio::sync::RwLock;

struct Inner {
    posts: BTreeMap<u64, AnimalPost>,
    next_id: u64,
}

/// In-memory table of animal posts.
///
/// Ids start at 1 and are never reused, even after a delete.
pub struct PostStore {
    inner: RwLock<Inner>,
}

impl Default for PostStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                posts: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `post` under a fresh id and returns the stored record.
    pub async fn create(&self, post: NewPost) -> AnimalPost {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let post = post.into_post(id);
        inner.posts.insert(id, post.clone());
        post
    }

    /// Replaces every field of an existing post. Returns `false` if the id
    /// is unknown.
    pub async fn update(&self, update: UpdatePost) -> bool {
        let mut inner = self.inner.write().await;
        match inner.posts.get_mut(&update.post_id) {
            Some(existing) => {
                *existing = update.fields.into_post(update.post_id);
                true
            }
            None => false,
        }
    }

    /// Removes a post. Returns `false` if the id is unknown.
    pub async fn delete(&self, post_id: u64) -> bool {
        self.inner.write().await.posts.remove(&post_id).is_some()
    }

    pub async fn get(&self, post_id: u64) -> Option<AnimalPost> {
        self.inner.read().await.posts.get(&post_id).cloned()
    }

    /// All posts, ordered by id
    pub async fn list(&self) -> Vec<AnimalPost> {
        self.inner.read().await.posts.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.posts.len()
    }
}

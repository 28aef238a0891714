//! In-memory store.
//!
//! Allows injecting failures and inspecting contents for tests.

use super::{LocalStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wallfeed_core::FeedEntity;

/// In-memory [`LocalStore`].
///
/// Clones share the same contents.
pub struct MemoryStore<T: FeedEntity> {
    inner: Arc<Mutex<MemoryStoreInner<T>>>,
}

struct MemoryStoreInner<T: FeedEntity> {
    records: HashMap<T::Id, T>,
    writes: usize,
    fail_next_write: Option<String>,
    fail_next_list: Option<String>,
}

impl<T: FeedEntity> Default for MemoryStoreInner<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            writes: 0,
            fail_next_write: None,
            fail_next_list: None,
        }
    }
}

impl<T: FeedEntity> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Whether an entity with `id` is stored.
    pub fn contains(&self, id: &T::Id) -> bool {
        self.lock().records.contains_key(id)
    }

    /// Number of successful upserts and deletes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Cause the next upsert or delete to fail with the given error.
    pub fn fail_next_write(&self, error: &str) {
        self.lock().fail_next_write = Some(error.to_string());
    }

    /// Cause the next `list_ordered()` to fail with the given error.
    pub fn fail_next_list(&self, error: &str) {
        self.lock().fail_next_list = Some(error.to_string());
    }
}

impl<T: FeedEntity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FeedEntity> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<T: FeedEntity> LocalStore<T> for MemoryStore<T> {
    async fn read(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        Ok(self.lock().records.get(id).cloned())
    }

    async fn upsert(&self, entity: &T) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_write.take() {
            return Err(StoreError::WriteFailed(error));
        }
        inner.records.insert(entity.id().clone(), entity.clone());
        inner.writes += 1;
        Ok(())
    }

    async fn delete(&self, id: &T::Id) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_write.take() {
            return Err(StoreError::WriteFailed(error));
        }
        inner.writes += 1;
        Ok(inner.records.remove(id).is_some())
    }

    async fn list_ordered(&self) -> Result<Vec<T>, StoreError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_list.take() {
            return Err(StoreError::Unavailable(error));
        }
        let mut all: Vec<T> = inner.records.values().cloned().collect();
        all.sort_by_key(|entity| entity.sort_key());
        Ok(all)
    }
}

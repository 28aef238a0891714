//! Local persistence adapter for wallfeed.
//!
//! This module abstracts the on-device storage behind every feed cache.
//!
//! # Design
//!
//! The store trait is async and keyed by entity id:
//! - `read()` loads one entity
//! - `upsert()` inserts or replaces an entity
//! - `delete()` removes an entity
//! - `list_ordered()` returns everything in feed order
//!
//! Only the feed writes to the store, after a merge or a local transition
//! has been validated.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use wallfeed_core::FeedEntity;
use wallfeed_types::FetchError;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Storage could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Write failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Stored data could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for FetchError {
    fn from(err: StoreError) -> Self {
        FetchError::Storage(err.to_string())
    }
}

/// Persistence for one feed's entities.
///
/// Implementations handle the actual storage mechanism (SQLite, files,
/// memory, etc).
#[async_trait]
pub trait LocalStore<T: FeedEntity>: Send + Sync {
    /// Load the entity with `id`, if stored.
    async fn read(&self, id: &T::Id) -> Result<Option<T>, StoreError>;

    /// Insert or replace an entity.
    async fn upsert(&self, entity: &T) -> Result<(), StoreError>;

    /// Remove an entity. Returns `true` if it existed.
    async fn delete(&self, id: &T::Id) -> Result<bool, StoreError>;

    /// All stored entities in feed order.
    async fn list_ordered(&self) -> Result<Vec<T>, StoreError>;
}

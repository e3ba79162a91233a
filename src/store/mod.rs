// Storage engine seam: the pipeline calls into this after the before-hooks
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::entity::Persistable;

/// Durable storage for one entity type
#[async_trait]
pub trait Storage<E: Persistable>: Send + Sync {
    /// Insert when `entity.is_new()`, update otherwise; on success the
    /// engine calls `entity.mark_persisted()`
    async fn save(&self, entity: &mut E) -> Result<(), StorageError>;

    async fn remove(&self, entity: &E) -> Result<(), StorageError>;

    /// Load the persisted state of an entity
    async fn find(&self, id: Uuid) -> Result<Option<E>, StorageError>;
}

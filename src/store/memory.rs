// In-memory storage engine
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::entity::Persistable;
use crate::store::Storage;

/// Keeps a snapshot of every persisted entity, keyed by id.
///
/// Snapshots are taken at write time, so changes made to an entity after
/// `save` returns are not visible through `find` until the next save.
pub struct MemoryStore<E> {
    records: RwLock<HashMap<Uuid, E>>,
}

impl<E: Persistable + Clone> MemoryStore<E> {
    pub fn new() -> Self {
        Self { records: RwLock::new(HashMap::new()) }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.records.read().contains_key(&id)
    }
}

impl<E: Persistable + Clone> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Persistable + Clone> Storage<E> for MemoryStore<E> {
    async fn save(&self, entity: &mut E) -> Result<(), StorageError> {
        let id = entity.id();
        let mut records = self.records.write();

        if entity.is_new() {
            if records.contains_key(&id) {
                return Err(StorageError::Conflict(id));
            }
            tracing::debug!("Inserting record {}", id);
        } else {
            if !records.contains_key(&id) {
                return Err(StorageError::NotFound(id));
            }
            tracing::debug!("Updating record {}", id);
        }

        entity.mark_persisted();
        records.insert(id, entity.clone());
        Ok(())
    }

    async fn remove(&self, entity: &E) -> Result<(), StorageError> {
        let id = entity.id();
        match self.records.write().remove(&id) {
            Some(_) => {
                tracing::debug!("Removed record {}", id);
                Ok(())
            }
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Option<E>, StorageError> {
        Ok(self.records.read().get(&id).cloned())
    }
}

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::lifecycle::event::Operation;

/// Per-operation state shared by the hooks of one save or remove.
///
/// Hooks hand data from their "before" half to their "after" half through
/// typed metadata; the context is created for one operation and dropped when
/// it finishes, so nothing outlives the operation or touches the entity.
///
/// Metadata is private to the hook that stored it: entries are keyed by the
/// slot of the hook currently running, so two hooks of the same type on one
/// pipeline each get their own value.
pub struct OperationContext {
    pub operation: Operation,
    pub model_name: String,
    pub entity_id: Uuid,

    // Slot of the hook currently running; set by the pipeline
    hook_slot: usize,
    metadata: HashMap<(usize, TypeId), Box<dyn Any + Send>>,

    pub start_time: Instant,
}

impl OperationContext {
    pub fn new(operation: Operation, model_name: impl Into<String>, entity_id: Uuid) -> Self {
        Self {
            operation,
            model_name: model_name.into(),
            entity_id,
            hook_slot: 0,
            metadata: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Select whose metadata the following calls read and write
    pub(crate) fn enter_hook(&mut self, slot: usize) {
        self.hook_slot = slot;
    }

    /// Store typed metadata for the current hook, replacing any previous value
    pub fn set_metadata<T: Send + 'static>(&mut self, data: T) {
        self.metadata.insert(self.key::<T>(), Box::new(data));
    }

    /// Remove and return the current hook's typed metadata
    pub fn take_metadata<T: Send + 'static>(&mut self) -> Option<T> {
        self.metadata.remove(&self.key::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Check if the current hook stored metadata of type T
    pub fn has_metadata<T: Send + 'static>(&self) -> bool {
        self.metadata.contains_key(&self.key::<T>())
    }

    fn key<T: 'static>(&self) -> (usize, TypeId) {
        (self.hook_slot, TypeId::of::<T>())
    }

    pub fn execution_time(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("operation", &self.operation)
            .field("model_name", &self.model_name)
            .field("entity_id", &self.entity_id)
            .field("hook_slot", &self.hook_slot)
            .field("metadata_entries", &self.metadata.len())
            .finish()
    }
}

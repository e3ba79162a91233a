// Hookable persistence pipeline: registered hooks run around the storage
// engine's save and remove, in registration order
pub mod context;
pub mod timestamps;
pub mod traits;

pub use context::*;
pub use timestamps::Timestamps;
pub use traits::*;

use std::sync::Arc;
use uuid::Uuid;

use crate::error::LifecycleError;
use crate::lifecycle::event::Operation;
use crate::model::entity::Persistable;
use crate::store::Storage;

pub struct PersistencePipeline<E: Persistable> {
    model_name: String,
    storage: Arc<dyn Storage<E>>,
    hooks: Vec<Arc<dyn PersistenceHook<E>>>,
}

impl<E: Persistable> PersistencePipeline<E> {
    /// Create a pipeline with no hooks registered
    pub fn new(model_name: impl Into<String>, storage: Arc<dyn Storage<E>>) -> Self {
        Self {
            model_name: model_name.into(),
            storage,
            hooks: Vec::new(),
        }
    }

    /// Register a hook; both halves run after every hook registered earlier
    pub fn register_hook(&mut self, hook: Arc<dyn PersistenceHook<E>>) {
        tracing::debug!("Registered hook '{}' for model '{}'", hook.name(), self.model_name);
        self.hooks.push(hook);
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn storage(&self) -> &Arc<dyn Storage<E>> {
        &self.storage
    }

    /// Run before-save hooks, write, then after-save hooks.
    ///
    /// A before-hook error aborts with no write. A storage error is returned
    /// as-is and no after-hook runs. An after-hook error is returned with the
    /// write left in place.
    pub async fn save(&self, entity: &mut E) -> Result<OperationContext, LifecycleError> {
        let mut ctx = OperationContext::new(Operation::Save, self.model_name.clone(), entity.id());

        tracing::info!(
            "Save pipeline starting: model={}, id={}, new={}",
            self.model_name, ctx.entity_id, entity.is_new()
        );

        for (slot, hook) in self.hooks.iter().enumerate() {
            ctx.enter_hook(slot);
            if let Err(error) = hook.before_save(&mut ctx, entity).await {
                tracing::warn!("Save of {} aborted by hook '{}': {}", ctx.entity_id, hook.name(), error);
                return Err(error);
            }
        }

        if let Err(error) = self.storage.save(entity).await {
            tracing::error!("Storage rejected save of {}: {}", ctx.entity_id, error);
            return Err(error.into());
        }

        for (slot, hook) in self.hooks.iter().enumerate() {
            ctx.enter_hook(slot);
            if let Err(error) = hook.after_save(&mut ctx, entity).await {
                tracing::warn!(
                    "Hook '{}' failed after {} was saved: {}",
                    hook.name(), ctx.entity_id, error
                );
                return Err(error);
            }
        }

        tracing::info!("Save of {} completed in {:?}", ctx.entity_id, ctx.execution_time());
        Ok(ctx)
    }

    /// Run before-remove hooks, delete, then after-remove hooks
    pub async fn remove(&self, entity: &mut E) -> Result<OperationContext, LifecycleError> {
        let mut ctx = OperationContext::new(Operation::Remove, self.model_name.clone(), entity.id());

        tracing::info!("Remove pipeline starting: model={}, id={}", self.model_name, ctx.entity_id);

        for (slot, hook) in self.hooks.iter().enumerate() {
            ctx.enter_hook(slot);
            if let Err(error) = hook.before_remove(&mut ctx, entity).await {
                tracing::warn!("Remove of {} aborted by hook '{}': {}", ctx.entity_id, hook.name(), error);
                return Err(error);
            }
        }

        if let Err(error) = self.storage.remove(entity).await {
            tracing::error!("Storage rejected remove of {}: {}", ctx.entity_id, error);
            return Err(error.into());
        }

        for (slot, hook) in self.hooks.iter().enumerate() {
            ctx.enter_hook(slot);
            if let Err(error) = hook.after_remove(&mut ctx, entity).await {
                tracing::warn!(
                    "Hook '{}' failed after {} was removed: {}",
                    hook.name(), ctx.entity_id, error
                );
                return Err(error);
            }
        }

        tracing::info!("Remove of {} completed in {:?}", ctx.entity_id, ctx.execution_time());
        Ok(ctx)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<E>, LifecycleError> {
        Ok(self.storage.find(id).await?)
    }
}

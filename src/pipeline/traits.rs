use async_trait::async_trait;

use crate::error::LifecycleError;
use crate::model::entity::Persistable;
use crate::pipeline::context::OperationContext;

/// A callback pair wrapped around the storage engine's save and remove.
///
/// "Before" methods run ahead of the write and may abort it by returning an
/// error. "After" methods run only once the write succeeded; an error there
/// is reported to the caller but does not undo the write.
#[async_trait]
pub trait PersistenceHook<E: Persistable>: Send + Sync {
    /// Hook name for logging and debugging
    fn name(&self) -> &'static str;

    async fn before_save(&self, _ctx: &mut OperationContext, _entity: &mut E) -> Result<(), LifecycleError> {
        Ok(())
    }

    async fn after_save(&self, _ctx: &mut OperationContext, _entity: &mut E) -> Result<(), LifecycleError> {
        Ok(())
    }

    async fn before_remove(&self, _ctx: &mut OperationContext, _entity: &mut E) -> Result<(), LifecycleError> {
        Ok(())
    }

    async fn after_remove(&self, _ctx: &mut OperationContext, _entity: &mut E) -> Result<(), LifecycleError> {
        Ok(())
    }
}

// Lifecycle interceptor: translates save/remove hooks into lifecycle events
// on the type scope and the definition scope
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::LifecycleError;
use crate::lifecycle::classification::SaveToken;
use crate::lifecycle::event::LifecycleEvent;
use crate::lifecycle::scope::ListenerScope;
use crate::model::entity::Persistable;
use crate::pipeline::context::OperationContext;
use crate::pipeline::traits::PersistenceHook;

/// Which events reach the definition scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefinitionBroadcast {
    /// Every event is delivered on both scopes
    #[default]
    All,
    /// Only beforeSave/afterSave reach the definition scope; the
    /// insert/update/remove events stay on the type scope
    SaveEventsOnly,
}

impl DefinitionBroadcast {
    pub fn includes(&self, event: LifecycleEvent) -> bool {
        match self {
            DefinitionBroadcast::All => true,
            DefinitionBroadcast::SaveEventsOnly => event.is_save_event(),
        }
    }
}

impl FromStr for DefinitionBroadcast {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DefinitionBroadcast::All),
            "save-events-only" | "save-only" | "save" => Ok(DefinitionBroadcast::SaveEventsOnly),
            other => Err(format!("unknown definition broadcast policy '{}'", other)),
        }
    }
}

/// Wraps a model's save and remove operations with before/after hooks.
///
/// Each event goes to the type scope first, then the definition scope.
/// The insert/update decision is made once in [`on_before_save`] and carried
/// to [`on_after_save`] in a [`SaveToken`]; the entity's live new-record flag
/// is never consulted after the write.
///
/// [`on_before_save`]: LifecycleInterceptor::on_before_save
/// [`on_after_save`]: LifecycleInterceptor::on_after_save
pub struct LifecycleInterceptor<E: Persistable> {
    type_scope: Arc<ListenerScope<E>>,
    definition_scope: Arc<ListenerScope<E>>,
    broadcast: DefinitionBroadcast,
}

impl<E: Persistable> LifecycleInterceptor<E> {
    pub fn new(
        type_scope: Arc<ListenerScope<E>>,
        definition_scope: Arc<ListenerScope<E>>,
        broadcast: DefinitionBroadcast,
    ) -> Self {
        Self { type_scope, definition_scope, broadcast }
    }

    pub fn broadcast(&self) -> DefinitionBroadcast {
        self.broadcast
    }

    /// Before a write: beforeSave, then beforeInsert or beforeUpdate
    pub async fn on_before_save(&self, entity: &mut E) -> Result<SaveToken, LifecycleError> {
        let token = SaveToken::capture(entity.is_new());
        tracing::debug!("Save of {} classified as {:?}", entity.id(), token.classification());

        self.dispatch(LifecycleEvent::BeforeSave, entity).await?;
        self.dispatch(token.classification().before_event(), entity).await?;
        Ok(token)
    }

    /// After a successful write: afterSave, then the after event matching
    /// the captured classification. Consumes the token.
    pub async fn on_after_save(&self, entity: &mut E, token: SaveToken) -> Result<(), LifecycleError> {
        let classification = token.into_classification();

        self.dispatch(LifecycleEvent::AfterSave, entity).await?;
        self.dispatch(classification.after_event(), entity).await
    }

    pub async fn on_before_remove(&self, entity: &mut E) -> Result<(), LifecycleError> {
        self.dispatch(LifecycleEvent::BeforeRemove, entity).await
    }

    pub async fn on_after_remove(&self, entity: &mut E) -> Result<(), LifecycleError> {
        self.dispatch(LifecycleEvent::AfterRemove, entity).await
    }

    /// Scopes an event is delivered to, in delivery order
    fn targets(&self, event: LifecycleEvent) -> Vec<&ListenerScope<E>> {
        let mut targets = vec![self.type_scope.as_ref()];
        if self.broadcast.includes(event) {
            targets.push(self.definition_scope.as_ref());
        }
        targets
    }

    async fn dispatch(&self, event: LifecycleEvent, entity: &mut E) -> Result<(), LifecycleError> {
        for scope in self.targets(event) {
            tracing::debug!("Emitting {} on {} scope '{}'", event, scope.kind(), scope.name());
            scope
                .emit(event, entity)
                .await
                .map_err(|error| LifecycleError::from_listener(event, scope.kind(), error))?;
        }
        Ok(())
    }
}

/// Pipeline attachment: the save token travels in this hook's slot of the
/// operation context between the before and after halves of one save
#[async_trait]
impl<E: Persistable> PersistenceHook<E> for LifecycleInterceptor<E> {
    fn name(&self) -> &'static str {
        "LifecycleInterceptor"
    }

    async fn before_save(&self, ctx: &mut OperationContext, entity: &mut E) -> Result<(), LifecycleError> {
        let token = self.on_before_save(entity).await?;
        ctx.set_metadata(token);
        Ok(())
    }

    async fn after_save(&self, ctx: &mut OperationContext, entity: &mut E) -> Result<(), LifecycleError> {
        let token = ctx
            .take_metadata::<SaveToken>()
            .ok_or(LifecycleError::MissingClassification)?;
        self.on_after_save(entity, token).await
    }

    async fn before_remove(&self, _ctx: &mut OperationContext, entity: &mut E) -> Result<(), LifecycleError> {
        self.on_before_remove(entity).await
    }

    async fn after_remove(&self, _ctx: &mut OperationContext, entity: &mut E) -> Result<(), LifecycleError> {
        self.on_after_remove(entity).await
    }
}

// Models: a named entity type bound to a definition and a storage engine
pub mod definition;
pub mod document;
pub mod entity;

pub use definition::ModelDefinition;
pub use document::{Document, DocumentError};
pub use entity::Persistable;

use futures::future::BoxFuture;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::LifecycleError;
use crate::lifecycle::error::ListenerError;
use crate::lifecycle::event::LifecycleEvent;
use crate::lifecycle::interceptor::LifecycleInterceptor;
use crate::lifecycle::scope::{ListenerId, ListenerScope, ScopeKind};
use crate::pipeline::{PersistenceHook, PersistencePipeline};
use crate::store::Storage;

/// An entity type: owns the type scope and the persistence pipeline.
///
/// When the definition has lifecycle events enabled, a
/// [`LifecycleInterceptor`] is registered as the first pipeline hook, wired
/// to this model's type scope and the definition's scope.
pub struct Model<E: Persistable> {
    name: String,
    scope: Arc<ListenerScope<E>>,
    definition: Arc<ModelDefinition<E>>,
    pipeline: PersistencePipeline<E>,
}

impl<E: Persistable> Model<E> {
    pub fn new(
        name: impl Into<String>,
        definition: Arc<ModelDefinition<E>>,
        storage: Arc<dyn Storage<E>>,
    ) -> Self {
        let name = name.into();
        let scope = Arc::new(ListenerScope::new(ScopeKind::Type, name.clone()));
        let mut pipeline = PersistencePipeline::new(name.clone(), storage);

        if definition.lifecycle_events() {
            pipeline.register_hook(Arc::new(LifecycleInterceptor::new(
                Arc::clone(&scope),
                Arc::clone(definition.scope()),
                definition.broadcast(),
            )));
        }

        tracing::debug!(
            "Model '{}' compiled from definition '{}' (lifecycle events: {})",
            name, definition.name(), definition.lifecycle_events()
        );

        Self { name, scope, definition, pipeline }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type scope
    pub fn scope(&self) -> &Arc<ListenerScope<E>> {
        &self.scope
    }

    pub fn definition(&self) -> &Arc<ModelDefinition<E>> {
        &self.definition
    }

    pub fn pipeline(&self) -> &PersistencePipeline<E> {
        &self.pipeline
    }

    /// Add a hook that runs after the ones already registered
    pub fn register_hook(&mut self, hook: Arc<dyn PersistenceHook<E>>) {
        self.pipeline.register_hook(hook);
    }

    /// Insert or update the entity, emitting lifecycle events around the write
    pub async fn save(&self, entity: &mut E) -> Result<(), LifecycleError> {
        self.pipeline.save(entity).await.map(|_| ())
    }

    /// Delete the entity, emitting lifecycle events around the delete
    pub async fn remove(&self, entity: &mut E) -> Result<(), LifecycleError> {
        self.pipeline.remove(entity).await.map(|_| ())
    }

    /// Load the persisted state of an entity
    pub async fn find(&self, id: Uuid) -> Result<Option<E>, LifecycleError> {
        self.pipeline.find(id).await
    }

    /// Subscribe a closure on the type scope
    pub fn on<F>(&self, event: LifecycleEvent, f: F) -> ListenerId
    where
        F: Fn(&mut E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.scope.on(event, f)
    }

    /// Subscribe an async closure on the type scope
    pub fn on_async<F>(&self, event: LifecycleEvent, f: F) -> ListenerId
    where
        F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, Result<(), ListenerError>> + Send + Sync + 'static,
    {
        self.scope.on_async(event, f)
    }

    pub fn off(&self, event: LifecycleEvent, id: ListenerId) -> bool {
        self.scope.unsubscribe(event, id)
    }

    pub fn remove_all_listeners(&self, event: LifecycleEvent) -> usize {
        self.scope.unsubscribe_all(event)
    }
}

impl<E: Persistable> std::fmt::Debug for Model<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("definition", &self.definition.name())
            .field("hooks", &self.pipeline.hook_names())
            .finish()
    }
}

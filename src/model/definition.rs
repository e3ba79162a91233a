use std::sync::Arc;

use crate::config::config;
use crate::lifecycle::interceptor::DefinitionBroadcast;
use crate::lifecycle::scope::{ListenerScope, ScopeKind};
use crate::model::entity::Persistable;

/// Schema-level definition shared by every model built from it.
///
/// Owns the definition scope: listeners subscribed here hear about saves and
/// removes of every model compiled from this definition. Lifecycle events
/// are opt-in per definition via [`with_lifecycle_events`].
///
/// [`with_lifecycle_events`]: ModelDefinition::with_lifecycle_events
pub struct ModelDefinition<E: Persistable> {
    name: String,
    scope: Arc<ListenerScope<E>>,
    lifecycle_events: bool,
    broadcast: DefinitionBroadcast,
}

impl<E: Persistable> ModelDefinition<E> {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            scope: Arc::new(ListenerScope::new(ScopeKind::Definition, name.clone())),
            name,
            lifecycle_events: false,
            broadcast: config().dispatch.definition_broadcast,
        }
    }

    /// Attach lifecycle events to models built from this definition
    pub fn with_lifecycle_events(mut self) -> Self {
        self.lifecycle_events = true;
        self
    }

    /// Override the configured broadcast policy for the definition scope
    pub fn with_broadcast(mut self, broadcast: DefinitionBroadcast) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifecycle_events(&self) -> bool {
        self.lifecycle_events
    }

    pub fn broadcast(&self) -> DefinitionBroadcast {
        self.broadcast
    }

    /// The definition scope
    pub fn scope(&self) -> &Arc<ListenerScope<E>> {
        &self.scope
    }
}

impl<E: Persistable> std::fmt::Debug for ModelDefinition<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("name", &self.name)
            .field("lifecycle_events", &self.lifecycle_events)
            .field("broadcast", &self.broadcast)
            .field("scope", &self.scope)
            .finish()
    }
}

// Listener scope: an independent observer registry keyed by lifecycle event
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::lifecycle::error::ListenerError;
use crate::lifecycle::event::LifecycleEvent;
use crate::lifecycle::listener::{AsyncFnListener, FnListener, Listener};

/// Which of the two broadcast channels a scope is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Shared by every instance of one model type
    Type,
    /// Shared by every model built from one definition
    Definition,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Type => f.write_str("type"),
            ScopeKind::Definition => f.write_str("definition"),
        }
    }
}

/// Handle returned by subscribe, used to unsubscribe a single listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Subscription<E: Send + 'static> {
    id: ListenerId,
    listener: Arc<dyn Listener<E>>,
}

/// Observer registry for one scope.
///
/// Dispatch is sequential in subscription order and awaits each listener.
/// The subscriber list is snapshotted when an emission starts, so listeners
/// that subscribe or unsubscribe while being notified only affect later
/// emissions.
pub struct ListenerScope<E: Send + 'static> {
    kind: ScopeKind,
    name: String,
    listeners: RwLock<HashMap<LifecycleEvent, Vec<Subscription<E>>>>,
    next_id: AtomicU64,
}

impl<E: Send + 'static> ListenerScope<E> {
    pub fn new(kind: ScopeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a listener for one event
    pub fn subscribe(&self, event: LifecycleEvent, listener: Arc<dyn Listener<E>>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(
            "Subscribed listener '{}' to {} on {} scope '{}'",
            listener.name(), event, self.kind, self.name
        );
        self.listeners
            .write()
            .entry(event)
            .or_default()
            .push(Subscription { id, listener });
        id
    }

    /// Register a synchronous closure
    pub fn on<F>(&self, event: LifecycleEvent, f: F) -> ListenerId
    where
        F: Fn(&mut E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let name = format!("{}:{}", self.name, event);
        self.subscribe(event, Arc::new(FnListener::new(name, f)))
    }

    /// Register a closure returning a boxed future
    pub fn on_async<F>(&self, event: LifecycleEvent, f: F) -> ListenerId
    where
        F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, Result<(), ListenerError>> + Send + Sync + 'static,
    {
        let name = format!("{}:{}", self.name, event);
        self.subscribe(event, Arc::new(AsyncFnListener::new(name, f)))
    }

    /// Remove one listener; false if it was not subscribed to this event
    pub fn unsubscribe(&self, event: LifecycleEvent, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(subscriptions) = listeners.get_mut(&event) else {
            return false;
        };
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() != before;
        if subscriptions.is_empty() {
            listeners.remove(&event);
        }
        removed
    }

    /// Remove every listener for one event, returning how many were removed
    pub fn unsubscribe_all(&self, event: LifecycleEvent) -> usize {
        let removed = self
            .listeners
            .write()
            .remove(&event)
            .map(|subscriptions| subscriptions.len())
            .unwrap_or(0);
        tracing::debug!(
            "Removed {} listener(s) for {} on {} scope '{}'",
            removed, event, self.kind, self.name
        );
        removed
    }

    /// Remove every listener for every event
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    pub fn listener_count(&self, event: LifecycleEvent) -> usize {
        self.listeners.read().get(&event).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Notify every listener of `event`, stopping at the first error
    pub async fn emit(&self, event: LifecycleEvent, entity: &mut E) -> Result<(), ListenerError> {
        let snapshot: Vec<Arc<dyn Listener<E>>> = self
            .listeners
            .read()
            .get(&event)
            .map(|subscriptions| subscriptions.iter().map(|s| Arc::clone(&s.listener)).collect())
            .unwrap_or_default();

        if snapshot.is_empty() {
            tracing::trace!("No listeners for {} on {} scope '{}'", event, self.kind, self.name);
            return Ok(());
        }

        for listener in snapshot {
            if let Err(error) = listener.on_event(event, entity).await {
                tracing::warn!(
                    "Listener '{}' rejected {} on {} scope '{}': {}",
                    listener.name(), event, self.kind, self.name, error
                );
                return Err(error);
            }
        }

        Ok(())
    }
}

impl<E: Send + 'static> fmt::Debug for ListenerScope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<LifecycleEvent, usize> = self
            .listeners
            .read()
            .iter()
            .map(|(event, subscriptions)| (*event, subscriptions.len()))
            .collect();
        f.debug_struct("ListenerScope")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("listeners", &counts)
            .finish()
    }
}

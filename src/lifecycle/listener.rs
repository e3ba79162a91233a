// Listener trait and closure adaptors
use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::lifecycle::error::ListenerError;
use crate::lifecycle::event::LifecycleEvent;

/// A subscriber on a listener scope.
///
/// Listeners receive the entity mutably: changes made during a "before"
/// event reach the storage write, changes made during an "after" event stay
/// on the in-memory entity only. Returning an error from a "before" event
/// aborts the operation.
#[async_trait]
pub trait Listener<E: Send>: Send + Sync {
    /// Listener name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn on_event(&self, event: LifecycleEvent, entity: &mut E) -> Result<(), ListenerError>;
}

/// Synchronous closure listener
pub struct FnListener<F> {
    name: String,
    f: F,
}

impl<F> FnListener<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<E, F> Listener<E> for FnListener<F>
where
    E: Send,
    F: Fn(&mut E) -> Result<(), ListenerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, _event: LifecycleEvent, entity: &mut E) -> Result<(), ListenerError> {
        (self.f)(entity)
    }
}

/// Closure listener that suspends; the closure returns a boxed future
/// borrowing the entity, e.g. `|doc| Box::pin(async move { ... })`
pub struct AsyncFnListener<F> {
    name: String,
    f: F,
}

impl<F> AsyncFnListener<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<E, F> Listener<E> for AsyncFnListener<F>
where
    E: Send,
    F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, Result<(), ListenerError>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, _event: LifecycleEvent, entity: &mut E) -> Result<(), ListenerError> {
        (self.f)(entity).await
    }
}

// Lifecycle events: names, listener scopes and the interceptor that emits
// them around save and remove
pub mod classification;
pub mod error;
pub mod event;
pub mod interceptor;
pub mod listener;
pub mod scope;

pub use classification::{Classification, SaveToken};
pub use error::ListenerError;
pub use event::{LifecycleEvent, Operation, Phase, UnknownEvent};
pub use interceptor::{DefinitionBroadcast, LifecycleInterceptor};
pub use listener::{AsyncFnListener, FnListener, Listener};
pub use scope::{ListenerId, ListenerScope, ScopeKind};

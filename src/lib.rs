pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod pipeline;
pub mod store;

pub use error::{LifecycleError, StorageError};
pub use lifecycle::{
    Classification, DefinitionBroadcast, LifecycleEvent, LifecycleInterceptor, Listener,
    ListenerError, ListenerId, ListenerScope, SaveToken, ScopeKind,
};
pub use model::{Document, Model, ModelDefinition, Persistable};
pub use pipeline::{OperationContext, PersistenceHook, PersistencePipeline, Timestamps};
pub use store::{MemoryStore, Storage};

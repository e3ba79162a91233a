#![allow(dead_code)]

use std::sync::{Arc, Once};

use parking_lot::Mutex;

use model_lifecycle::{
    DefinitionBroadcast, Document, LifecycleEvent, ListenerScope, MemoryStore, Model,
    ModelDefinition, Persistable, ScopeKind, Storage,
};

static TRACING: Once = Once::new();

/// Route library logs through the test harness (RUST_LOG=debug to see them)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A `Post` model over a fresh in-memory store, with lifecycle events on
pub fn post_model(broadcast: DefinitionBroadcast) -> (Model<Document>, Arc<MemoryStore<Document>>) {
    init_tracing();
    let definition = Arc::new(
        ModelDefinition::new("PostSchema")
            .with_lifecycle_events()
            .with_broadcast(broadcast),
    );
    model_for(definition, "Post")
}

/// A model built from an existing definition, over its own store
pub fn model_for(
    definition: Arc<ModelDefinition<Document>>,
    name: &str,
) -> (Model<Document>, Arc<MemoryStore<Document>>) {
    let store = Arc::new(MemoryStore::new());
    let model = Model::new(name, definition, store.clone() as Arc<dyn Storage<Document>>);
    (model, store)
}

/// Records every delivery on the scopes it is attached to
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<(ScopeKind, LifecycleEvent)>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the model's type scope and its definition's scope
    pub fn attach(model: &Model<Document>) -> Self {
        let log = Self::new();
        log.listen(model.scope());
        log.listen(model.definition().scope());
        log
    }

    pub fn listen(&self, scope: &ListenerScope<Document>) {
        let kind = scope.kind();
        for event in LifecycleEvent::ALL {
            let entries = Arc::clone(&self.entries);
            scope.on(event, move |_doc: &mut Document| {
                entries.lock().push((kind, event));
                Ok(())
            });
        }
    }

    pub fn entries(&self) -> Vec<(ScopeKind, LifecycleEvent)> {
        self.entries.lock().clone()
    }

    /// Events delivered on one scope, in order
    pub fn on_scope(&self, scope: ScopeKind) -> Vec<LifecycleEvent> {
        self.entries
            .lock()
            .iter()
            .filter(|(kind, _)| *kind == scope)
            .map(|(_, event)| *event)
            .collect()
    }

    pub fn count(&self, scope: ScopeKind, event: LifecycleEvent) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| **entry == (scope, event))
            .count()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// String value of a document field, if any
pub fn field(doc: &Document, key: &str) -> Option<String> {
    doc.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Persisted state of a document, failing if the store has no record of it
pub async fn persisted(store: &MemoryStore<Document>, doc: &Document) -> anyhow::Result<Document> {
    store
        .find(doc.id())
        .await?
        .ok_or_else(|| anyhow::anyhow!("record {} not persisted", doc.id()))
}

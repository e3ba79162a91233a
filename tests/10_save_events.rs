mod common;

use anyhow::Result;

use common::{field, persisted, post_model, EventLog};
use model_lifecycle::{DefinitionBroadcast, Document, LifecycleEvent, Persistable, ScopeKind};

// These tests follow a document through an insert and an update and check
// which listeners ran, what they could change, and what reached storage.

fn set_title_foo(doc: &mut Document) -> Result<(), model_lifecycle::ListenerError> {
    doc.set("title", "foo");
    Ok(())
}

/// Second save in every scenario: blank the title and touch the slug
fn edit_for_update(doc: &mut Document) {
    doc.set("title", "");
    doc.set("slug", "foo");
}

#[tokio::test]
async fn before_save_runs_before_insert() -> Result<()> {
    let (post, store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::BeforeSave, set_title_foo);

    let mut doc = Document::new();
    assert!(!doc.has("title"));
    post.save(&mut doc).await?;

    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(!doc.has_changes(), "mutation before the write must be persisted");
    let stored = persisted(&store, &doc).await?;
    assert_eq!(field(&stored, "title").as_deref(), Some("foo"));
    Ok(())
}

#[tokio::test]
async fn before_save_runs_before_update() -> Result<()> {
    let (post, store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::BeforeSave, set_title_foo);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    edit_for_update(&mut doc);
    post.save(&mut doc).await?;

    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(!doc.has_changes());
    let stored = persisted(&store, &doc).await?;
    assert_eq!(field(&stored, "title").as_deref(), Some("foo"));
    assert_eq!(field(&stored, "slug").as_deref(), Some("foo"));
    Ok(())
}

#[tokio::test]
async fn before_insert_runs_on_first_save_only() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::BeforeInsert, set_title_foo);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(!doc.has_changes());

    edit_for_update(&mut doc);
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some(""));
    assert!(!doc.has_changes());
    Ok(())
}

#[tokio::test]
async fn before_update_skips_first_save() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::BeforeUpdate, set_title_foo);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert!(!doc.has("title"));
    assert!(!doc.has_changes());

    edit_for_update(&mut doc);
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(!doc.has_changes());
    Ok(())
}

#[tokio::test]
async fn after_save_mutations_stay_in_memory() -> Result<()> {
    let (post, store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::AfterSave, set_title_foo);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(doc.has_changes(), "mutation after the write is not persisted");
    assert_eq!(field(&persisted(&store, &doc).await?, "title"), None);

    edit_for_update(&mut doc);
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(doc.has_changes());
    assert_eq!(field(&persisted(&store, &doc).await?, "title").as_deref(), Some(""));
    Ok(())
}

#[tokio::test]
async fn after_insert_runs_after_first_save_only() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::AfterInsert, set_title_foo);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(doc.has_changes());

    edit_for_update(&mut doc);
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some(""));
    assert!(!doc.has_changes());
    Ok(())
}

#[tokio::test]
async fn after_update_skips_first_save() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    post.on(LifecycleEvent::AfterUpdate, set_title_foo);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert!(!doc.has("title"));
    assert!(!doc.has_changes());

    edit_for_update(&mut doc);
    post.save(&mut doc).await?;
    assert_eq!(field(&doc, "title").as_deref(), Some("foo"));
    assert!(doc.has_changes());
    Ok(())
}

#[tokio::test]
async fn insert_then_update_delivers_each_classified_event_once() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    let log = EventLog::attach(&post);

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    doc.set("title", "changed");
    post.save(&mut doc).await?;

    use LifecycleEvent::*;
    let expected = vec![
        BeforeSave, BeforeInsert, AfterSave, AfterInsert,
        BeforeSave, BeforeUpdate, AfterSave, AfterUpdate,
    ];
    assert_eq!(log.on_scope(ScopeKind::Type), expected);
    assert_eq!(log.on_scope(ScopeKind::Definition), expected);

    assert_eq!(log.count(ScopeKind::Type, BeforeInsert), 1);
    assert_eq!(log.count(ScopeKind::Type, AfterUpdate), 1);
    assert_eq!(log.count(ScopeKind::Type, BeforeUpdate), 1);
    assert_eq!(log.count(ScopeKind::Type, AfterInsert), 1);
    Ok(())
}

#[tokio::test]
async fn subscribed_insert_and_update_listeners_fire_once_each() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    let counts = std::sync::Arc::new(parking_lot::Mutex::new([0usize; 4]));

    for (slot, event) in [
        LifecycleEvent::BeforeInsert,
        LifecycleEvent::AfterUpdate,
        LifecycleEvent::BeforeUpdate,
        LifecycleEvent::AfterInsert,
    ]
    .into_iter()
    .enumerate()
    {
        let counts = std::sync::Arc::clone(&counts);
        post.on(event, move |_doc: &mut Document| {
            counts.lock()[slot] += 1;
            Ok(())
        });
    }

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert_eq!(*counts.lock(), [1, 0, 0, 1]);

    doc.set("title", "second");
    post.save(&mut doc).await?;
    assert_eq!(*counts.lock(), [1, 1, 1, 1]);
    Ok(())
}

#[tokio::test]
async fn classification_survives_flag_flip_during_write() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));

    let after = std::sync::Arc::clone(&seen);
    post.on(LifecycleEvent::AfterInsert, move |doc: &mut Document| {
        // The storage engine already cleared the flag
        after.lock().push(doc.is_new());
        Ok(())
    });

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert_eq!(*seen.lock(), vec![false]);
    Ok(())
}

#[tokio::test]
async fn unsubscribed_listeners_stop_receiving() -> Result<()> {
    let (post, _store) = post_model(DefinitionBroadcast::All);
    let id = post.on(LifecycleEvent::BeforeSave, set_title_foo);
    assert!(post.off(LifecycleEvent::BeforeSave, id));

    let mut doc = Document::new();
    post.save(&mut doc).await?;
    assert!(!doc.has("title"));

    post.on(LifecycleEvent::BeforeSave, set_title_foo);
    post.on(LifecycleEvent::BeforeSave, set_title_foo);
    assert_eq!(post.remove_all_listeners(LifecycleEvent::BeforeSave), 2);
    post.save(&mut doc).await?;
    assert!(!doc.has("title"));
    Ok(())
}

// Stamps created_at / updated_at on documents ahead of the write
use async_trait::async_trait;
use chrono::Utc;

use crate::error::LifecycleError;
use crate::model::document::Document;
use crate::model::entity::Persistable;
use crate::pipeline::context::OperationContext;
use crate::pipeline::traits::PersistenceHook;

#[derive(Debug, Default)]
pub struct Timestamps;

#[async_trait]
impl PersistenceHook<Document> for Timestamps {
    fn name(&self) -> &'static str {
        "Timestamps"
    }

    async fn before_save(&self, _ctx: &mut OperationContext, entity: &mut Document) -> Result<(), LifecycleError> {
        let now = Utc::now().to_rfc3339();
        if entity.is_new() {
            entity.set_system_field("created_at", now.clone());
        }
        entity.set_system_field("updated_at", now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::event::Operation;

    #[tokio::test]
    async fn stamps_created_only_on_insert() {
        let mut doc = Document::new();
        let mut ctx = OperationContext::new(Operation::Save, "Post", doc.id());

        Timestamps.before_save(&mut ctx, &mut doc).await.unwrap();
        let created = doc.created_at().unwrap();
        assert!(doc.updated_at().is_some());

        doc.mark_persisted();
        doc.set_system_field("created_at", "2020-01-01T00:00:00Z");
        Timestamps.before_save(&mut ctx, &mut doc).await.unwrap();
        assert_ne!(doc.created_at(), Some(created));
        assert_eq!(doc.created_at().unwrap().to_rfc3339(), "2020-01-01T00:00:00+00:00");
    }
}

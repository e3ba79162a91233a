use uuid::Uuid;

/// An entity that can be saved and removed through a persistence pipeline.
///
/// The pipeline borrows the entity mutably for one operation; listeners see
/// the same borrow.
pub trait Persistable: Send + Sync + 'static {
    /// Stable identity used by the storage engine
    fn id(&self) -> Uuid;

    /// New-record flag: true until the entity has been durably written
    fn is_new(&self) -> bool;

    /// Called by the storage engine right after a successful write: clears
    /// the new-record flag and any pending changes
    fn mark_persisted(&mut self);
}

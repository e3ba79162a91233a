use serde::{Deserialize, Serialize};

use crate::lifecycle::event::LifecycleEvent;

/// Insert-vs-update decision for one save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Insert,
    Update,
}

impl Classification {
    /// Classify from the entity's new-record flag
    pub fn from_new_record(is_new: bool) -> Self {
        if is_new {
            Classification::Insert
        } else {
            Classification::Update
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Classification::Insert)
    }

    pub fn before_event(&self) -> LifecycleEvent {
        match self {
            Classification::Insert => LifecycleEvent::BeforeInsert,
            Classification::Update => LifecycleEvent::BeforeUpdate,
        }
    }

    pub fn after_event(&self) -> LifecycleEvent {
        match self {
            Classification::Insert => LifecycleEvent::AfterInsert,
            Classification::Update => LifecycleEvent::AfterUpdate,
        }
    }
}

/// Classification captured by the before-save hook and handed unchanged to
/// the after-save hook of the same save.
///
/// Not `Clone`: the after-save hook consumes it, after which no
/// classification exists for that save.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a SaveToken must be passed to the matching after-save hook"]
pub struct SaveToken {
    classification: Classification,
}

impl SaveToken {
    pub(crate) fn capture(is_new: bool) -> Self {
        Self { classification: Classification::from_new_record(is_new) }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub(crate) fn into_classification(self) -> Classification {
        self.classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_classify_as_insert() {
        let token = SaveToken::capture(true);
        assert_eq!(token.classification(), Classification::Insert);
        assert_eq!(token.classification().before_event(), LifecycleEvent::BeforeInsert);
        assert_eq!(token.into_classification().after_event(), LifecycleEvent::AfterInsert);
    }

    #[test]
    fn persisted_records_classify_as_update() {
        let classification = Classification::from_new_record(false);
        assert!(!classification.is_insert());
        assert_eq!(classification.before_event(), LifecycleEvent::BeforeUpdate);
        assert_eq!(classification.after_event(), LifecycleEvent::AfterUpdate);
    }
}

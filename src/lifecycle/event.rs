// Lifecycle event names - the fixed public contract of the dispatcher
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The eight notifications emitted around save and remove operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEvent {
    BeforeSave,
    BeforeInsert,
    BeforeUpdate,
    AfterSave,
    AfterInsert,
    AfterUpdate,
    BeforeRemove,
    AfterRemove,
}

/// Whether an event fires ahead of the storage write or after it succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// Persistence operation an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Save,
    Remove,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown lifecycle event: {0}")]
pub struct UnknownEvent(pub String);

impl LifecycleEvent {
    /// All events in firing order for an insert, an update and a remove
    pub const ALL: [LifecycleEvent; 8] = [
        LifecycleEvent::BeforeSave,
        LifecycleEvent::BeforeInsert,
        LifecycleEvent::BeforeUpdate,
        LifecycleEvent::AfterSave,
        LifecycleEvent::AfterInsert,
        LifecycleEvent::AfterUpdate,
        LifecycleEvent::BeforeRemove,
        LifecycleEvent::AfterRemove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforeSave => "beforeSave",
            LifecycleEvent::BeforeInsert => "beforeInsert",
            LifecycleEvent::BeforeUpdate => "beforeUpdate",
            LifecycleEvent::AfterSave => "afterSave",
            LifecycleEvent::AfterInsert => "afterInsert",
            LifecycleEvent::AfterUpdate => "afterUpdate",
            LifecycleEvent::BeforeRemove => "beforeRemove",
            LifecycleEvent::AfterRemove => "afterRemove",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            LifecycleEvent::BeforeSave
            | LifecycleEvent::BeforeInsert
            | LifecycleEvent::BeforeUpdate
            | LifecycleEvent::BeforeRemove => Phase::Before,
            LifecycleEvent::AfterSave
            | LifecycleEvent::AfterInsert
            | LifecycleEvent::AfterUpdate
            | LifecycleEvent::AfterRemove => Phase::After,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            LifecycleEvent::BeforeRemove | LifecycleEvent::AfterRemove => Operation::Remove,
            _ => Operation::Save,
        }
    }

    /// True for the two events fired on every save regardless of classification
    pub fn is_save_event(&self) -> bool {
        matches!(self, LifecycleEvent::BeforeSave | LifecycleEvent::AfterSave)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

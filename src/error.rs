// Crate-level error types for persistence operations
use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::error::ListenerError;
use crate::lifecycle::event::{LifecycleEvent, Phase};
use crate::lifecycle::scope::ScopeKind;

/// Failures reported by a storage engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Record already exists: {0}")]
    Conflict(Uuid),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced to the caller of save / remove
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{event} vetoed on {scope} scope: {reason}")]
    Vetoed {
        event: LifecycleEvent,
        scope: ScopeKind,
        reason: String,
    },

    #[error("{event} listener failed on {scope} scope: {message}")]
    ListenerFailed {
        event: LifecycleEvent,
        scope: ScopeKind,
        message: String,
    },

    #[error("After-save hook ran without a captured classification")]
    MissingClassification,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LifecycleError {
    /// Annotate a listener error with where it was raised
    pub fn from_listener(event: LifecycleEvent, scope: ScopeKind, error: ListenerError) -> Self {
        match error {
            ListenerError::Veto { reason } => LifecycleError::Vetoed { event, scope, reason },
            ListenerError::Failed(message) => LifecycleError::ListenerFailed { event, scope, message },
        }
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, LifecycleError::Vetoed { .. })
    }

    /// Event during which the error was raised (None for storage failures)
    pub fn event(&self) -> Option<LifecycleEvent> {
        match self {
            LifecycleError::Vetoed { event, .. } | LifecycleError::ListenerFailed { event, .. } => Some(*event),
            LifecycleError::MissingClassification => Some(LifecycleEvent::AfterSave),
            LifecycleError::Storage(_) => None,
        }
    }

    /// True when the write or delete already happened; nothing is rolled back
    pub fn operation_committed(&self) -> bool {
        self.event().map(|event| event.phase() == Phase::After).unwrap_or(false)
    }
}

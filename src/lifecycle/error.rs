use thiserror::Error;

/// Outcome a listener reports when it does not let the operation continue
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Deliberate abort (e.g. a business rule rejected the entity)
    #[error("Vetoed: {reason}")]
    Veto { reason: String },

    /// Anything the listener did not expect
    #[error("Listener failed: {0}")]
    Failed(String),
}

impl ListenerError {
    pub fn veto(reason: impl Into<String>) -> Self {
        ListenerError::Veto { reason: reason.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ListenerError::Failed(message.into())
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, ListenerError::Veto { .. })
    }
}

impl From<anyhow::Error> for ListenerError {
    fn from(error: anyhow::Error) -> Self {
        ListenerError::Failed(error.to_string())
    }
}

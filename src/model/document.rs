use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::model::entity::Persistable;

/// Fields managed by the document itself or by hooks, never by input JSON
const SYSTEM_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// Errors that can occur while building a Document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("System field '{0}' cannot be set via input")]
    SystemFieldNotAllowed(String),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
}

/// A dynamic JSON document with change tracking
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: Uuid,
    /// New-record flag
    is_new: bool,
    /// Current field values
    fields: Map<String, Value>,
    /// Fields changed since the last successful write
    modified_fields: BTreeSet<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new, never persisted document
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            is_new: true,
            fields: Map::new(),
            modified_fields: BTreeSet::new(),
        }
    }

    /// Create a new document from input JSON, rejecting system fields
    pub fn from_json(json: Value) -> Result<Self, DocumentError> {
        let Value::Object(map) = json else {
            return Err(DocumentError::InvalidJson("Expected JSON object".to_string()));
        };

        let mut document = Self::new();
        for (key, value) in map {
            if SYSTEM_FIELDS.contains(&key.as_str()) {
                return Err(DocumentError::SystemFieldNotAllowed(key));
            }
            document.set(key, value);
        }
        Ok(document)
    }

    /// Get field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Check whether a field is present
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set field value with change tracking
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            tracing::warn!("Attempted to set system field '{}' - ignoring", key);
            return self;
        }
        self.write_field(key, value.into());
        self
    }

    /// Set a system field (hooks only)
    pub fn set_system_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.write_field(key.into(), value.into());
        self
    }

    /// Remove field (chainable)
    pub fn unset(&mut self, key: &str) -> &mut Self {
        if self.fields.remove(key).is_some() {
            self.modified_fields.insert(key.to_string());
        }
        self
    }

    fn write_field(&mut self, key: String, value: Value) {
        if self.fields.get(&key) != Some(&value) {
            self.modified_fields.insert(key.clone());
        }
        self.fields.insert(key, value);
    }

    /// Fields changed since the last successful write
    pub fn changed_fields(&self) -> Vec<&str> {
        self.modified_fields.iter().map(String::as_str).collect()
    }

    /// Check if there are unsaved changes (the document's delta)
    pub fn has_changes(&self) -> bool {
        !self.modified_fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("created_at")
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("updated_at")
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key)
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// JSON view with the id inlined
    pub fn to_json(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        Value::Object(map)
    }
}

impl Persistable for Document {
    fn id(&self) -> Uuid {
        self.id
    }

    fn is_new(&self) -> bool {
        self.is_new
    }

    fn mark_persisted(&mut self) {
        self.is_new = false;
        self.modified_fields.clear();
    }
}

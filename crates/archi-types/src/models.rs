use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::document::{Document, DocumentId, Fields};

/// A registered display name. Created once per session by the username gate;
/// never mutated or deleted. No uniqueness is enforced — repeated
/// registrations of the same name simply accumulate in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DocumentId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            username: required_text(doc, "username"),
            created_at: doc.created_at,
        }
    }

    pub fn fields(username: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("username".into(), Value::String(username.to_string()));
        fields
    }
}

/// A chat message. Immutable once created; ordered by `created_at`
/// ascending with ties broken by store insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: DocumentId,
    pub text: String,
    pub sender: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            text: required_text(doc, "text"),
            sender: required_text(doc, "sender"),
            created_at: doc.created_at,
        }
    }

    pub fn fields(text: &str, sender: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("text".into(), Value::String(text.to_string()));
        fields.insert("sender".into(), Value::String(sender.to_string()));
        fields
    }
}

/// A suggestion note. Created and deleted, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: DocumentId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Suggestion {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            text: required_text(doc, "text"),
            created_at: doc.created_at,
        }
    }

    pub fn fields(text: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("text".into(), Value::String(text.to_string()));
        fields
    }
}

/// A missing or mistyped field must not take down a whole snapshot; log it
/// and fall back to an empty string.
fn required_text(doc: &Document, name: &str) -> String {
    match doc.text_field(name) {
        Some(s) => s.to_string(),
        None => {
            warn!("document {} has no text field '{}'", doc.id, name);
            String::new()
        }
    }
}

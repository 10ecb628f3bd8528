use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The three logical collections the client touches.
pub mod collections {
    pub const USERS: &str = "users";
    pub const MESSAGES: &str = "messages";
    pub const SUGGESTIONS: &str = "suggestions";
}

/// Store-assigned document identifier, unique per collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Free-form field map carried by every document.
pub type Fields = Map<String, Value>;

/// A schema-flexible record as stored and delivered by the document store.
/// `created_at` is assigned server-side at create time, never by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

use archi_store::DocumentStore;
use archi_types::document::{DocumentId, collections};
use archi_types::models::{Message, Suggestion, User};
use tracing::{error, warn};

/// Thin wrappers turning application intents into store calls. The only
/// local validation is non-empty-after-trim; store failures are logged and
/// swallowed, so every operation degrades to "the change did not happen".
pub struct ChatApi<S> {
    store: S,
}

impl<S: DocumentStore> ChatApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a display name. No collision check — duplicates accumulate.
    /// Returns `None` for blank input or a failed write.
    pub async fn register_user(&self, name: &str) -> Option<User> {
        let name = name.trim();
        if name.is_empty() {
            warn!("rejecting blank username");
            return None;
        }
        match self
            .store
            .create(collections::USERS, User::fields(name))
            .await
        {
            Ok(doc) => Some(User::from_document(&doc)),
            Err(e) => {
                error!("error saving username: {}", e);
                None
            }
        }
    }

    /// Post a message. Blank text is a no-op; a failed write is dropped
    /// silently beyond the log — no retry.
    pub async fn send_message(&self, text: &str, sender: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Err(e) = self
            .store
            .create(collections::MESSAGES, Message::fields(text, sender))
            .await
        {
            error!("error sending message: {}", e);
        }
    }

    /// Create a suggestion and hand back the stored entry (assigned id plus
    /// the text that was sent) for the caller's optimistic append.
    pub async fn add_suggestion(&self, text: &str) -> Option<Suggestion> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match self
            .store
            .create(collections::SUGGESTIONS, Suggestion::fields(text))
            .await
        {
            Ok(doc) => Some(Suggestion::from_document(&doc)),
            Err(e) => {
                error!("error adding suggestion: {}", e);
                None
            }
        }
    }

    /// Delete a suggestion by identifier. True only if the store confirmed.
    pub async fn delete_suggestion(&self, id: &DocumentId) -> bool {
        match self.store.delete(collections::SUGGESTIONS, id).await {
            Ok(()) => true,
            Err(e) => {
                error!("error deleting suggestion {}: {}", id, e);
                false
            }
        }
    }

    /// One-shot fetch of the suggestions collection, used only at mount.
    /// Later remote changes are not reflected — suggestions have no
    /// subscription.
    pub async fn list_suggestions(&self) -> Vec<Suggestion> {
        match self.store.list(collections::SUGGESTIONS).await {
            Ok(docs) => docs.iter().map(Suggestion::from_document).collect(),
            Err(e) => {
                error!("error fetching suggestions: {}", e);
                Vec::new()
            }
        }
    }
}

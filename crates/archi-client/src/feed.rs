use archi_store::{DocumentStore, StoreError, Subscription};
use archi_types::document::collections;
use archi_types::models::Message;

/// Live local mirror of the `messages` collection. Holds the one standing
/// subscription for as long as the chat view is active; dropping the feed
/// releases it. Every delivered snapshot replaces the whole mirror — no
/// incremental diffing, no pagination, no backfill limit.
pub struct MessageFeed {
    subscription: Subscription,
    mirror: Vec<Message>,
}

impl MessageFeed {
    pub async fn open(store: &impl DocumentStore) -> Result<Self, StoreError> {
        let subscription = store.subscribe(collections::MESSAGES).await?;
        Ok(Self {
            subscription,
            mirror: Vec::new(),
        })
    }

    /// Wait for the next snapshot and replace the mirror wholesale.
    /// Returns false once the feed is closed.
    pub async fn changed(&mut self) -> bool {
        match self.subscription.recv().await {
            Some(snapshot) => {
                self.mirror = snapshot.iter().map(Message::from_document).collect();
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.mirror
    }
}

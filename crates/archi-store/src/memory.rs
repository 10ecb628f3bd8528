use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use archi_types::document::{Document, DocumentId, Fields};
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

use crate::error::StoreError;
use crate::subscription::Subscription;
use crate::DocumentStore;

/// In-process store with the same observable semantics as the hosted one:
/// snapshots ordered by `(created_at, insertion seq)`, watchers that get the
/// current snapshot on subscribe and a fresh one after every mutation.
/// Backs the test suite and `archi --offline`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: RwLock<HashMap<String, Vec<Stored>>>,
    watchers: RwLock<HashMap<String, Vec<mpsc::UnboundedSender<Vec<Document>>>>>,
    seq: AtomicU64,
}

struct Stored {
    seq: u64,
    doc: Document,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert_at(
        &self,
        collection: &str,
        fields: Fields,
        created_at: DateTime<Utc>,
    ) -> Document {
        let doc = Document {
            id: DocumentId::generate(),
            fields,
            created_at,
        };
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        {
            let mut collections = self.inner.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .push(Stored {
                    seq,
                    doc: doc.clone(),
                });
        }
        doc
    }

    async fn snapshot_of(&self, collection: &str) -> Vec<Document> {
        let collections = self.inner.collections.read().await;
        let Some(stored) = collections.get(collection) else {
            return Vec::new();
        };
        let mut ordered: Vec<(u64, Document)> =
            stored.iter().map(|s| (s.seq, s.doc.clone())).collect();
        ordered.sort_by(|a, b| (a.1.created_at, a.0).cmp(&(b.1.created_at, b.0)));
        ordered.into_iter().map(|(_, doc)| doc).collect()
    }

    /// Push a fresh snapshot to every live watcher of the collection.
    /// Watchers whose receiving end is gone are pruned here.
    async fn publish(&self, collection: &str) {
        let snapshot = self.snapshot_of(collection).await;
        let mut watchers = self.inner.watchers.write().await;
        if let Some(list) = watchers.get_mut(collection) {
            list.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }

    #[cfg(test)]
    async fn watcher_count(&self, collection: &str) -> usize {
        let watchers = self.inner.watchers.read().await;
        watchers.get(collection).map_or(0, Vec::len)
    }
}

impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let doc = self.insert_at(collection, fields, Utc::now()).await;
        debug!("created {}/{}", collection, doc.id);
        self.publish(collection).await;
        Ok(doc)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.snapshot_of(collection).await)
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.inner.collections.write().await;
            let Some(stored) = collections.get_mut(collection) else {
                return Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.clone(),
                });
            };
            let before = stored.len();
            stored.retain(|s| &s.doc.id != id);
            stored.len() < before
        };
        if !removed {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            });
        }
        debug!("deleted {}/{}", collection, id);
        self.publish(collection).await;
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Seed and register under the watchers lock: a concurrent mutation
        // either lands in the initial snapshot or publishes to the already
        // registered sender, never neither. `publish` releases `collections`
        // before it takes `watchers`, so holding both here cannot deadlock.
        let mut watchers = self.inner.watchers.write().await;
        let initial = self.snapshot_of(collection).await;
        let _ = tx.send(initial);
        watchers
            .entry(collection.to_string())
            .or_default()
            .push(tx);
        Ok(Subscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archi_types::models::Message;
    use chrono::TimeZone;

    #[tokio::test]
    async fn subscribe_receives_initial_snapshot() {
        let store = MemoryStore::new();
        store
            .create("messages", Message::fields("hi", "ada"))
            .await
            .unwrap();

        let mut sub = store.subscribe("messages").await.unwrap();
        let snapshot = sub.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text_field("text"), Some("hi"));
    }

    #[tokio::test]
    async fn every_mutation_publishes_a_full_snapshot() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("messages").await.unwrap();
        assert!(sub.recv().await.unwrap().is_empty());

        store
            .create("messages", Message::fields("one", "ada"))
            .await
            .unwrap();
        let doc = store
            .create("messages", Message::fields("two", "bob"))
            .await
            .unwrap();

        assert_eq!(sub.recv().await.unwrap().len(), 1);
        assert_eq!(sub.recv().await.unwrap().len(), 2);

        store.delete("messages", &doc.id).await.unwrap();
        let snapshot = sub.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text_field("text"), Some("one"));
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .delete("suggestions", &DocumentId::from("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let first = store
            .insert_at("messages", Message::fields("first", "ada"), at)
            .await;
        let second = store
            .insert_at("messages", Message::fields("second", "ada"), at)
            .await;

        let listed = store.list("messages").await.unwrap();
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn subscriber_never_misses_a_concurrent_create() {
        use std::time::Duration;

        for _ in 0..64 {
            let store = MemoryStore::new();
            let writer = store.clone();
            let write = tokio::spawn(async move {
                writer
                    .create("messages", Message::fields("raced", "ada"))
                    .await
                    .unwrap();
            });

            let mut sub = store.subscribe("messages").await.unwrap();
            write.await.unwrap();

            // The create completed, so it must be in the initial snapshot
            // or in a delivery queued behind it — never lost to the gap
            // between snapshotting and watcher registration.
            let mut snapshot = sub.recv().await.unwrap();
            if snapshot.is_empty() {
                snapshot = tokio::time::timeout(Duration::from_secs(1), sub.recv())
                    .await
                    .expect("create fell between initial snapshot and registration")
                    .unwrap();
            }
            assert_eq!(snapshot.len(), 1);
            assert_eq!(snapshot[0].text_field("text"), Some("raced"));
        }
    }

    #[tokio::test]
    async fn dropped_watcher_is_pruned_on_publish() {
        let store = MemoryStore::new();
        let sub = store.subscribe("messages").await.unwrap();
        assert_eq!(store.watcher_count("messages").await, 1);

        drop(sub);
        store
            .create("messages", Message::fields("hi", "ada"))
            .await
            .unwrap();
        assert_eq!(store.watcher_count("messages").await, 0);
    }
}

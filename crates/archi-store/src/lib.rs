pub mod config;
pub mod error;
pub mod memory;
pub mod remote;
pub mod subscription;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use subscription::Subscription;

use archi_types::document::{Document, DocumentId, Fields};

/// Contract offered by the hosted document store: create/list/delete plus an
/// ordered-query subscription that pushes the full result set on every
/// mutation. Implemented by [`RemoteStore`] over the wire and by
/// [`MemoryStore`] in process.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    /// Store a new document. The store assigns the id and `created_at`.
    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Fetch the full current collection, created-time ascending.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Delete a document by identifier.
    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError>;

    /// Open a standing subscription over "all documents, `created_at`
    /// ascending". Delivers the complete snapshot immediately and again on
    /// every change made by any client — no deltas.
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError>;
}

use archi_types::document::DocumentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected request ({code}): {body}")]
    Status { code: u16, body: String },

    #[error("no document '{id}' in collection '{collection}'")]
    NotFound { collection: String, id: DocumentId },

    #[error("missing configuration: {0} is not set")]
    Config(String),
}

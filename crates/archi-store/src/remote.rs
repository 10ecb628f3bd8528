use archi_types::document::{Document, DocumentId, Fields};
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::subscription::Subscription;
use crate::DocumentStore;

/// HTTP client for the hosted document store. Plain requests for
/// create/list/delete; the subscription is a long-lived streaming response
/// of newline-delimited full snapshots, pumped by a background task.
#[derive(Clone)]
pub struct RemoteStore {
    http: Client,
    base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<Document>,
}

impl RemoteStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            http: Client::new(),
            base: format!(
                "{}/v1/projects/{}",
                config.base_url.trim_end_matches('/'),
                config.project_id
            ),
            api_key: config.api_key.clone(),
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/documents", self.base, collection)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let code = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status { code, body })
    }
}

impl DocumentStore for RemoteStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let resp = self
            .http
            .post(self.documents_url(collection))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<Document>().await?)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let resp = self
            .http
            .get(self.documents_url(collection))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<DocumentList>().await?.documents)
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let resp = self
            .http
            .delete(format!("{}/{}", self.documents_url(collection), id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        let resp = self
            .http
            .get(format!("{}:listen", self.documents_url(collection)))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let resp = Self::check(resp).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_snapshots(resp, tx));
        Ok(Subscription::with_pump(rx, pump))
    }
}

/// Reads the listen stream and forwards decoded snapshots until either side
/// goes away. Aborted by `Subscription::drop`.
async fn pump_snapshots(resp: reqwest::Response, tx: mpsc::UnboundedSender<Vec<Document>>) {
    let mut stream = resp.bytes_stream();
    let mut decoder = SnapshotDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("listen stream error: {}", e);
                break;
            }
        };
        for snapshot in decoder.feed(&chunk) {
            if tx.send(snapshot).is_err() {
                return;
            }
        }
    }
    debug!("listen stream closed");
}

/// Splits the listen byte stream into newline-delimited snapshot frames.
/// Frames may straddle chunk boundaries; malformed frames are skipped.
struct SnapshotDecoder {
    buf: Vec<u8>,
}

impl SnapshotDecoder {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<Document>> {
        self.buf.extend_from_slice(chunk);
        let mut snapshots = Vec::new();

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = &line[..line.len() - 1];
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<DocumentList>(line) {
                Ok(list) => snapshots.push(list.documents),
                Err(e) => warn!("skipping malformed snapshot frame: {}", e),
            }
        }
        snapshots
    }
}

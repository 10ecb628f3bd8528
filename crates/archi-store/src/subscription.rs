use archi_types::document::Document;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Receiving end of a snapshot subscription. Owns the background pump task
/// (when there is one) so that dropping the handle releases the listener —
/// exactly one subscription is open for the chat view's lifetime and it is
/// torn down at unmount.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Vec<Document>>) -> Self {
        Self { rx, pump: None }
    }

    pub(crate) fn with_pump(
        rx: mpsc::UnboundedReceiver<Vec<Document>>,
        pump: JoinHandle<()>,
    ) -> Self {
        Self {
            rx,
            pump: Some(pump),
        }
    }

    /// Next full snapshot, or `None` once the feed is closed.
    pub async fn recv(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.rx.close();
    }
}

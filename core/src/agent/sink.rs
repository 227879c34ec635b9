use tokio::sync::mpsc;
use tracing::warn;

pub const DEFAULT_SINK_CAPACITY: usize = 32;

#[derive(Clone)]
pub struct ReplySink {
    tx: mpsc::Sender<String>,
}

impl ReplySink {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueues one user-visible reply. A closed receiver drops the message
    /// instead of failing the sender.
    pub async fn send(&self, text: impl Into<String>) {
        let text = text.into();
        if self.tx.send(text).await.is_err() {
            warn!("reply sink closed, dropping message");
        }
    }
}

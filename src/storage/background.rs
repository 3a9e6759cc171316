//! Fire-and-forget write-through on a tokio task.
//!
//! `save` only enqueues; a single writer task drains the queue in order
//! and runs each write on the blocking pool. Failures are logged and never
//! reach the session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::engine::models::GameState;
use crate::engine::session::StatePort;
use crate::storage::{KeyValueStore, Persistence};

pub struct BackgroundWriter<K> {
    persistence: Arc<Persistence<K>>,
    tx: mpsc::UnboundedSender<GameState>,
    handle: JoinHandle<usize>,
}

impl<K: KeyValueStore + 'static> BackgroundWriter<K> {
    /// Must be called from within a tokio runtime.
    pub fn spawn(persistence: Arc<Persistence<K>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<GameState>();
        let writer = Arc::clone(&persistence);
        let handle = tokio::spawn(async move {
            let mut queue = UnboundedReceiverStream::new(rx);
            let mut written = 0usize;
            while let Some(state) = queue.next().await {
                let p = Arc::clone(&writer);
                match tokio::task::spawn_blocking(move || p.save_state(&state)).await {
                    Ok(Ok(())) => written += 1,
                    Ok(Err(e)) => tracing::warn!(error = %e, "background save failed"),
                    Err(e) => tracing::error!(error = %e, "background save task panicked"),
                }
            }
            tracing::debug!(written, "background writer drained");
            written
        });
        Self { persistence, tx, handle }
    }

    pub fn persistence(&self) -> &Persistence<K> {
        &self.persistence
    }

    /// Close the queue and wait for pending writes. Returns how many
    /// writes succeeded over the writer's lifetime.
    pub async fn shutdown(self) -> usize {
        drop(self.tx);
        match self.handle.await {
            Ok(written) => written,
            Err(e) => {
                tracing::error!(error = %e, "background writer task failed");
                0
            }
        }
    }
}

impl<K: KeyValueStore + 'static> StatePort for BackgroundWriter<K> {
    fn load(&self) -> Option<GameState> {
        self.persistence.load_state()
    }

    fn save(&self, state: &GameState) {
        if self.tx.send(state.clone()).is_err() {
            tracing::warn!("background writer is gone, dropping save");
        }
    }
}

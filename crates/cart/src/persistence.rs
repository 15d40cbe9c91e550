//! Background persistence worker for cart snapshots.
//!
//! Mutations enqueue tasks synchronously; a single tokio task applies them to
//! storage in enqueue order. Failures are logged and dropped: the in-memory
//! cart stays authoritative for the running session.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::storage::KeyValueStorage;

/// Work item for the persistence worker.
#[derive(Debug)]
pub(crate) enum PersistTask {
    /// Overwrite the slot with a full cart snapshot.
    Write {
        key: String,
        payload: String,
        version: u64,
    },
    /// Erase the slot entirely.
    Erase { key: String, version: u64 },
    /// Acknowledge once every earlier task has been applied.
    Flush(oneshot::Sender<()>),
    /// Drain and stop.
    Shutdown,
}

/// Handle to the running worker. Cheap to clone.
#[derive(Debug, Clone)]
pub(crate) struct PersistenceQueue {
    tx: mpsc::UnboundedSender<PersistTask>,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PersistenceQueue {
    /// Spawn the worker on the given runtime.
    pub(crate) fn start(
        runtime: &tokio::runtime::Handle,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = runtime.spawn(run(storage, rx));

        Self {
            tx,
            handle: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Fire-and-forget: the caller never learns whether the write landed.
    pub(crate) fn enqueue(&self, task: PersistTask) {
        if let Err(err) = self.tx.send(task) {
            tracing::warn!(
                task = ?err.0,
                "persistence worker stopped; dropping cart persistence task"
            );
        }
    }

    /// Wait until every task enqueued before this call has been applied.
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.enqueue(PersistTask::Flush(ack_tx));
        // A stopped worker drops the sender; nothing left to wait for.
        let _ = ack_rx.await;
    }

    /// Drain outstanding tasks and stop the worker.
    pub(crate) async fn shutdown(&self) {
        self.enqueue(PersistTask::Shutdown);

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::error!("cart persistence worker terminated abnormally: {err:?}");
            }
        }
    }
}

async fn run(storage: Arc<dyn KeyValueStorage>, mut rx: mpsc::UnboundedReceiver<PersistTask>) {
    tracing::debug!("cart persistence worker started");

    while let Some(task) = rx.recv().await {
        match task {
            PersistTask::Write {
                key,
                payload,
                version,
            } => match storage.set(&key, &payload).await {
                Ok(()) => tracing::debug!(key = %key, version, "persisted cart snapshot"),
                Err(err) => tracing::error!(
                    key = %key,
                    version,
                    "failed to persist cart snapshot; continuing with in-memory cart: {err}"
                ),
            },
            PersistTask::Erase { key, version } => match storage.remove(&key).await {
                Ok(()) => tracing::debug!(key = %key, version, "erased persisted cart"),
                Err(err) => tracing::error!(
                    key = %key,
                    version,
                    "failed to erase persisted cart: {err}"
                ),
            },
            PersistTask::Flush(ack) => {
                let _ = ack.send(());
            }
            PersistTask::Shutdown => break,
        }
    }

    tracing::debug!("cart persistence worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    #[tokio::test]
    async fn tasks_apply_in_enqueue_order() {
        let storage = Arc::new(InMemoryStorage::new());
        let queue = PersistenceQueue::start(&tokio::runtime::Handle::current(), storage.clone());

        for version in 1..=5u64 {
            queue.enqueue(PersistTask::Write {
                key: "cart".into(),
                payload: format!("v{version}"),
                version,
            });
        }
        queue.flush().await;

        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("v5"));

        queue.enqueue(PersistTask::Erase {
            key: "cart".into(),
            version: 6,
        });
        queue.flush().await;
        assert!(!storage.contains_key("cart"));
    }

    #[tokio::test]
    async fn shutdown_drains_then_later_tasks_are_dropped() {
        let storage = Arc::new(InMemoryStorage::new());
        let queue = PersistenceQueue::start(&tokio::runtime::Handle::current(), storage.clone());

        queue.enqueue(PersistTask::Write {
            key: "cart".into(),
            payload: "before".into(),
            version: 1,
        });
        queue.shutdown().await;

        queue.enqueue(PersistTask::Write {
            key: "cart".into(),
            payload: "after".into(),
            version: 2,
        });
        // Must not hang once the worker is gone.
        queue.flush().await;
        queue.shutdown().await;

        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("before"));
    }
}

// Batch upload with bounded concurrency
//
// Delivers every item of one sealed batch to the destination store under a
// fixed worker window, independent of batch size. Individual item failures
// are captured as outcomes, never raised; the call itself only fails on an
// invalid (empty) batch.

use std::sync::Arc;

use anyhow::{bail, Result};
use futures::stream::{self, StreamExt};
use zip2store_core::batch::{Batch, OutputItem};

use crate::store::ObjectStore;

const ITEM_CONTENT_TYPE: &str = "application/octet-stream";

/// Per-item delivery result.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Delivered {
        name: String,
        key: String,
        token: String,
    },
    Failed {
        name: String,
        key: String,
        error: String,
    },
}

/// Result of uploading one batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchOutcome {
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UploadOutcome::Delivered { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn is_full_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Uploads batches through the shared store handle with a fixed worker
/// limit. Large batches are delivered in successive worker-sized waves.
pub struct BatchUploader {
    store: Arc<dyn ObjectStore>,
    workers: usize,
}

impl BatchUploader {
    pub fn new(store: Arc<dyn ObjectStore>, workers: usize) -> Self {
        Self {
            store,
            workers: workers.max(1),
        }
    }

    /// Deliver every item of `batch`, keyed `{prefix}/{name}`, each with a
    /// blake3 content checksum. Delivered items are never retracted, even
    /// when a later item of the same batch fails.
    pub async fn upload(&self, batch: Batch) -> Result<BatchOutcome> {
        if batch.is_empty() {
            bail!("cannot upload an empty batch");
        }

        let prefix = batch.prefix;
        let outcomes = stream::iter(batch.items.into_iter().map(|item| {
            let prefix = prefix.clone();
            let store = Arc::clone(&self.store);
            async move { upload_item(store, &prefix, item).await }
        }))
        .buffered(self.workers)
        .collect::<Vec<_>>()
        .await;

        Ok(BatchOutcome { outcomes })
    }
}

async fn upload_item(store: Arc<dyn ObjectStore>, prefix: &str, item: OutputItem) -> UploadOutcome {
    let OutputItem { name, bytes } = item;
    let key = format!("{prefix}/{name}");
    let checksum = hex::encode(blake3::hash(&bytes).as_bytes());

    match store.put(&key, bytes, ITEM_CONTENT_TYPE, &checksum).await {
        Ok(token) => {
            tracing::debug!(key = %key, token = %token, "item delivered");
            UploadOutcome::Delivered { name, key, token }
        }
        Err(err) => {
            tracing::warn!(key = %key, error = format!("{err:#}"), "item upload failed");
            UploadOutcome::Failed {
                name,
                key,
                error: format!("{err:#}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OpenDalStore;
    use anyhow::anyhow;
    use opendal::{services, Operator};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn batch(prefix: &str, names: &[&str]) -> Batch {
        Batch {
            prefix: prefix.to_string(),
            items: names
                .iter()
                .map(|name| OutputItem {
                    name: name.to_string(),
                    bytes: format!("content of {name}").into_bytes(),
                })
                .collect(),
        }
    }

    fn memory_store() -> (Operator, Arc<dyn ObjectStore>) {
        let op = Operator::new(services::Memory::default()).unwrap().finish();
        (op.clone(), Arc::new(OpenDalStore::new(op)))
    }

    /// Fails every put whose key contains a marker substring.
    struct SelectiveFailStore {
        inner: Arc<dyn ObjectStore>,
        fail_marker: &'static str,
        puts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ObjectStore for SelectiveFailStore {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            content_type: &str,
            checksum_hex: &str,
        ) -> Result<String> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if key.contains(self.fail_marker) {
                return Err(anyhow!("injected store failure for {key}"));
            }
            self.inner.put(key, bytes, content_type, checksum_hex).await
        }
    }

    #[tokio::test]
    async fn full_success_delivers_every_item_under_the_prefix() {
        let (op, store) = memory_store();
        let uploader = BatchUploader::new(store, 4);

        let outcome = uploader
            .upload(batch("uploads/b1", &["a.xml", "b.xml", "c.xml"]))
            .await
            .unwrap();

        assert!(outcome.is_full_success());
        assert_eq!(outcome.delivered(), 3);
        let data = op.read("uploads/b1/b.xml").await.unwrap();
        assert_eq!(data.to_vec(), b"content of b.xml");
    }

    #[tokio::test]
    async fn partial_failure_keeps_delivered_items_in_the_store() {
        let (op, inner) = memory_store();
        let store = Arc::new(SelectiveFailStore {
            inner,
            fail_marker: "b.xml",
            puts: AtomicUsize::new(0),
        });
        let uploader = BatchUploader::new(store.clone(), 2);

        let outcome = uploader
            .upload(batch("uploads/b2", &["a.xml", "b.xml", "c.xml"]))
            .await
            .unwrap();

        assert!(!outcome.is_full_success());
        assert_eq!(outcome.delivered(), 2);
        assert_eq!(outcome.failed(), 1);
        // Every item was attempted despite the failure.
        assert_eq!(store.puts.load(Ordering::SeqCst), 3);
        // No rollback: the siblings of the failed item remain retrievable.
        assert!(op.read("uploads/b2/a.xml").await.is_ok());
        assert!(op.read("uploads/b2/c.xml").await.is_ok());
        assert!(op.read("uploads/b2/b.xml").await.is_err());
    }

    /// Counts in-flight puts so tests can observe the concurrency window.
    struct InFlightTrackingStore {
        current: AtomicUsize,
        max_seen: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ObjectStore for InFlightTrackingStore {
        async fn put(
            &self,
            _key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
            checksum_hex: &str,
        ) -> Result<String> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            // Hold the slot long enough for the window to fill.
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(checksum_hex.to_string())
        }
    }

    #[tokio::test]
    async fn in_flight_puts_never_exceed_the_worker_window() {
        let store = Arc::new(InFlightTrackingStore {
            current: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let uploader = BatchUploader::new(store.clone(), 2);

        let names: Vec<String> = (0..8).map(|n| format!("{n}.xml")).collect();
        let borrowed: Vec<&str> = names.iter().map(String::as_str).collect();
        let outcome = uploader.upload(batch("uploads/waves", &borrowed)).await.unwrap();

        assert!(outcome.is_full_success());
        assert_eq!(store.current.load(Ordering::SeqCst), 0);
        assert!(
            store.max_seen.load(Ordering::SeqCst) <= 2,
            "saw {} concurrent puts with 2 workers",
            store.max_seen.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn outcomes_preserve_batch_order() {
        let (_, store) = memory_store();
        let uploader = BatchUploader::new(store, 2);

        let outcome = uploader
            .upload(batch("uploads/b3", &["1.xml", "2.xml", "3.xml", "4.xml"]))
            .await
            .unwrap();

        let names: Vec<_> = outcome
            .outcomes
            .iter()
            .map(|o| match o {
                UploadOutcome::Delivered { name, .. } => name.clone(),
                UploadOutcome::Failed { name, .. } => name.clone(),
            })
            .collect();
        assert_eq!(names, ["1.xml", "2.xml", "3.xml", "4.xml"]);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_as_a_precondition() {
        let (_, store) = memory_store();
        let uploader = BatchUploader::new(store, 2);

        let err = uploader
            .upload(Batch {
                prefix: "uploads/empty".to_string(),
                items: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty batch"));
    }
}

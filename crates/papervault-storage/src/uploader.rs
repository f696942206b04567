//! Durable upload of final payloads.
//!
//! Wraps a [`Storage`] backend with a per-attempt timeout and bounded retries.
//! The key is chosen once before the first attempt and the payload stays in
//! memory until an attempt succeeds, so every retry rewrites the same object.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};

const BASE_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Where a payload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
}

#[derive(Clone)]
pub struct StorageUploader {
    storage: Arc<dyn Storage>,
    max_retries: u32,
    timeout: Duration,
    base_backoff: Duration,
}

impl StorageUploader {
    pub fn new(storage: Arc<dyn Storage>, max_retries: u32, timeout: Duration) -> Self {
        Self {
            storage,
            max_retries,
            timeout,
            base_backoff: BASE_BACKOFF,
        }
    }

    /// Override the delay before the first retry (doubles on every further retry).
    pub fn with_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Upload `data` under a fresh key in `folder`.
    ///
    /// Fatal backend errors are returned immediately; other failures are retried
    /// up to `max_retries` times. When every attempt fails the key is deleted on a
    /// best-effort basis, since a timed out write may still land later.
    pub async fn store(
        &self,
        data: Bytes,
        folder: &str,
        extension: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(folder, extension);
        let size_bytes = data.len() as u64;
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            let result = tokio::time::timeout(
                self.timeout,
                self.storage
                    .upload_with_key(&key, data.clone(), content_type),
            )
            .await
            .unwrap_or_else(|_| Err(StorageError::Timeout(self.timeout.as_secs())));

            let err = match result {
                Ok(url) => {
                    tracing::debug!(
                        key = %key,
                        size_bytes,
                        attempts = attempt + 1,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Payload stored"
                    );
                    return Ok(StoredObject {
                        key,
                        url,
                        size_bytes,
                    });
                }
                Err(err) => err,
            };

            if err.is_fatal() {
                tracing::error!(error = %err, key = %key, "Storage backend unavailable");
                return Err(err);
            }

            if !err.is_retryable() || attempt >= self.max_retries {
                tracing::warn!(
                    error = %err,
                    key = %key,
                    attempts = attempt + 1,
                    "Upload failed, giving up"
                );
                self.release(std::slice::from_ref(&key)).await;
                return Err(err);
            }

            let delay = self.backoff_for(attempt);
            tracing::warn!(
                error = %err,
                key = %key,
                attempt = attempt + 1,
                retry_in_ms = delay.as_millis() as u64,
                "Upload attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Best-effort delete of `keys`. Failures are logged, never returned.
    pub async fn release(&self, keys: &[String]) {
        for key in keys {
            let outcome = tokio::time::timeout(self.timeout, self.storage.delete(key)).await;
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, key = %key, "Failed to release stored payload")
                }
                Err(_) => tracing::warn!(key = %key, "Timed out releasing stored payload"),
            }
        }
    }
}

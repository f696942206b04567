//! Read paths and admin operations on papers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use papervault_core::{filter_visible, AppError, PaperFilter, PaperResponse};
use papervault_db::PaperStore;
use papervault_storage::{Storage, StorageError};
use uuid::Uuid;

#[derive(Clone)]
pub struct PaperService {
    store: Arc<dyn PaperStore>,
    storage: Arc<dyn Storage>,
    delete_timeout: Duration,
}

impl PaperService {
    /// `delete_timeout` bounds each payload delete during [`Self::admin_delete`].
    pub fn new(
        store: Arc<dyn PaperStore>,
        storage: Arc<dyn Storage>,
        delete_timeout: Duration,
    ) -> Self {
        Self {
            store,
            storage,
            delete_timeout,
        }
    }

    async fn delete_payload(&self, key: &str) -> Result<(), StorageError> {
        match tokio::time::timeout(self.delete_timeout, self.storage.delete(key)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.delete_timeout.as_secs())),
        }
    }

    /// Public listing: newest first, hidden files and empty papers removed.
    pub async fn list_visible(&self, filter: &PaperFilter) -> Result<Vec<PaperResponse>, AppError> {
        let papers = self.store.list(filter).await?;
        let total = papers.len();
        let visible: Vec<PaperResponse> = papers
            .into_iter()
            .map(PaperResponse::from)
            .filter_map(filter_visible)
            .collect();

        tracing::debug!(total, visible = visible.len(), "Listed papers");
        Ok(visible)
    }

    /// Every paper with every file, regardless of votes.
    pub async fn admin_list(&self) -> Result<Vec<PaperResponse>, AppError> {
        let papers = self.store.list(&PaperFilter::default()).await?;
        Ok(papers.into_iter().map(PaperResponse::from).collect())
    }

    /// Delete the stored payloads, then the paper.
    ///
    /// Payload deletes are idempotent, so when one fails or times out the paper
    /// is kept and the whole operation can simply be retried.
    #[tracing::instrument(skip(self))]
    pub async fn admin_delete(&self, id: Uuid) -> Result<(), AppError> {
        let paper = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Paper not found".to_string()))?;

        let keys = paper.storage_keys();
        let results = join_all(keys.iter().map(|key| self.delete_payload(key))).await;
        let failures: Vec<String> = keys
            .iter()
            .zip(results)
            .filter_map(|(key, result)| result.err().map(|e| format!("{}: {}", key, e)))
            .collect();

        if !failures.is_empty() {
            tracing::error!(
                paper_id = %id,
                failed = failures.len(),
                errors = ?failures,
                "Failed to delete stored payloads, paper kept"
            );
            return Err(AppError::Storage(format!(
                "Failed to delete {} of {} payloads",
                failures.len(),
                keys.len()
            )));
        }

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Paper not found".to_string()));
        }

        tracing::info!(paper_id = %id, payloads = keys.len(), "Paper deleted");
        Ok(())
    }
}

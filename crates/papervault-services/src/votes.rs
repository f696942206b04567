use std::sync::Arc;

use papervault_core::{AppError, PaperFile, Vote};
use papervault_db::PaperStore;
use uuid::Uuid;

/// Up/down votes on individual files.
///
/// The increment itself happens inside the store in one atomic step; this type
/// only names the operations and logs them.
#[derive(Clone)]
pub struct VoteLedger {
    store: Arc<dyn PaperStore>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn PaperStore>) -> Self {
        Self { store }
    }

    pub async fn upvote(&self, paper_id: Uuid, index: usize) -> Result<PaperFile, AppError> {
        self.cast(paper_id, index, Vote::Up).await
    }

    pub async fn downvote(&self, paper_id: Uuid, index: usize) -> Result<PaperFile, AppError> {
        self.cast(paper_id, index, Vote::Down).await
    }

    async fn cast(&self, paper_id: Uuid, index: usize, vote: Vote) -> Result<PaperFile, AppError> {
        let file = self.store.record_vote(paper_id, index, vote).await?;
        tracing::debug!(
            paper_id = %paper_id,
            index,
            vote = vote.counter_field(),
            upvotes = file.upvotes,
            downvotes = file.downvotes,
            "Vote recorded"
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papervault_core::{filter_visible, FileKind, NewPaper, PaperFilter, PaperResponse};
    use papervault_db::InMemoryPaperStore;

    async fn seeded() -> (Arc<InMemoryPaperStore>, Uuid) {
        let store = Arc::new(InMemoryPaperStore::new());
        let paper = store
            .create(NewPaper {
                subject: "math".to_string(),
                semester: "1".to_string(),
                description: String::new(),
                files: vec![PaperFile::stored(
                    "http://localhost/uploads/a.pdf".to_string(),
                    "papers/math/a.pdf".to_string(),
                    FileKind::Pdf,
                    "a.pdf".to_string(),
                    "application/pdf".to_string(),
                    3,
                )],
            })
            .await
            .unwrap();
        (store, paper.id)
    }

    #[tokio::test]
    async fn test_concurrent_upvotes_all_count() {
        let (store, id) = seeded().await;
        let ledger = VoteLedger::new(store.clone());

        let votes = (0..25).map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.upvote(id, 0).await })
        });
        for vote in futures::future::join_all(votes).await {
            vote.unwrap().unwrap();
        }

        let paper = store.get(id).await.unwrap().unwrap();
        assert_eq!(paper.files[0].upvotes, 25);
    }

    #[tokio::test]
    async fn test_third_downvote_hides_file_from_listing_only() {
        let (store, id) = seeded().await;
        let ledger = VoteLedger::new(store.clone());

        ledger.downvote(id, 0).await.unwrap();
        let second = ledger.downvote(id, 0).await.unwrap();
        assert_eq!(second.downvotes, 2);
        let listed = store.list(&PaperFilter::default()).await.unwrap();
        assert!(filter_visible(PaperResponse::from(listed[0].clone())).is_some());

        let third = ledger.downvote(id, 0).await.unwrap();
        assert_eq!(third.downvotes, 3);
        let listed = store.list(&PaperFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(filter_visible(PaperResponse::from(listed[0].clone())).is_none());
    }

    #[tokio::test]
    async fn test_missing_targets() {
        let (store, id) = seeded().await;
        let ledger = VoteLedger::new(store);

        let err = ledger.upvote(Uuid::new_v4(), 0).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: Paper not found");
        let err = ledger.downvote(id, 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: File not found");
    }
}

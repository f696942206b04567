//! In-memory stores with the same contract as the Postgres repositories.
//!
//! Every operation holds the store lock for its whole read-modify-write, so
//! vote increments are as atomic here as the single-statement SQL update.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use papervault_core::{
    normalize_subject, AppError, Feedback, NewPaper, Paper, PaperFile, PaperFilter, Subject, Vote,
};
use uuid::Uuid;

use super::feedback::FeedbackStore;
use super::papers::{file_not_found, paper_not_found, PaperStore};
use super::subjects::{subject_exists, SubjectStore};

fn poisoned() -> AppError {
    AppError::Internal("in-memory store lock poisoned".to_string())
}

#[derive(Default)]
pub struct InMemoryPaperStore {
    papers: Mutex<Vec<Paper>>,
    fail_creates: Mutex<bool>,
}

impl InMemoryPaperStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create` fail, to exercise rollback paths.
    pub fn fail_creates(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_creates.lock() {
            *flag = fail;
        }
    }

    /// Insert a fully formed paper, bypassing id and timestamp assignment.
    pub fn insert(&self, paper: Paper) {
        if let Ok(mut papers) = self.papers.lock() {
            papers.push(paper);
        }
    }

    pub fn len(&self) -> usize {
        self.papers.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PaperStore for InMemoryPaperStore {
    async fn create(&self, paper: NewPaper) -> Result<Paper, AppError> {
        if *self.fail_creates.lock().map_err(|_| poisoned())? {
            return Err(AppError::Internal("paper insert failed".to_string()));
        }

        let mut papers = self.papers.lock().map_err(|_| poisoned())?;
        // Keep creation times strictly increasing so newest-first is deterministic.
        let now = Utc::now();
        let created_at = match papers.iter().map(|p| p.created_at).max() {
            Some(last) if last >= now => last + Duration::microseconds(1),
            _ => now,
        };
        let paper = Paper {
            id: Uuid::new_v4(),
            subject: paper.subject,
            semester: paper.semester,
            description: paper.description,
            files: paper.files,
            created_at,
        };
        papers.push(paper.clone());
        Ok(paper)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Paper>, AppError> {
        let papers = self.papers.lock().map_err(|_| poisoned())?;
        Ok(papers.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, filter: &PaperFilter) -> Result<Vec<Paper>, AppError> {
        let papers = self.papers.lock().map_err(|_| poisoned())?;
        let mut matching: Vec<Paper> = papers.iter().filter(|p| filter.matches(p)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut papers = self.papers.lock().map_err(|_| poisoned())?;
        let before = papers.len();
        papers.retain(|p| p.id != id);
        Ok(papers.len() < before)
    }

    async fn record_vote(
        &self,
        id: Uuid,
        index: usize,
        vote: Vote,
    ) -> Result<PaperFile, AppError> {
        let mut papers = self.papers.lock().map_err(|_| poisoned())?;
        let paper = papers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(paper_not_found)?;
        let file = paper.files.get_mut(index).ok_or_else(file_not_found)?;
        file.record_vote(vote);
        Ok(file.clone())
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackStore {
    entries: Mutex<Vec<Feedback>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Feedback> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn create(&self, message: &str, email: &str) -> Result<Feedback, AppError> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            message: message.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.entries
            .lock()
            .map_err(|_| poisoned())?
            .push(feedback.clone());
        Ok(feedback)
    }
}

#[derive(Default)]
pub struct InMemorySubjectStore {
    subjects: Mutex<Vec<Subject>>,
}

impl InMemorySubjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubjectStore for InMemorySubjectStore {
    async fn list(&self) -> Result<Vec<Subject>, AppError> {
        let mut subjects = self.subjects.lock().map_err(|_| poisoned())?.clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn create(&self, name: &str) -> Result<Subject, AppError> {
        let mut subjects = self.subjects.lock().map_err(|_| poisoned())?;
        let key = normalize_subject(name);
        if subjects.iter().any(|s| normalize_subject(&s.name) == key) {
            return Err(subject_exists());
        }
        let subject = Subject {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        subjects.push(subject.clone());
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use papervault_core::FileKind;

    use super::*;

    fn new_paper(subject: &str, files: usize) -> NewPaper {
        NewPaper {
            subject: subject.to_string(),
            semester: "3".to_string(),
            description: String::new(),
            files: (0..files)
                .map(|i| {
                    PaperFile::stored(
                        format!("http://localhost/uploads/{}.pdf", i),
                        format!("papers/{}/{}.pdf", subject, i),
                        FileKind::Pdf,
                        format!("{}.pdf", i),
                        "application/pdf".to_string(),
                        100,
                    )
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let store = InMemoryPaperStore::new();
        let first = store.create(new_paper("math", 1)).await.unwrap();
        let second = store.create(new_paper("physics", 1)).await.unwrap();
        let third = store.create(new_paper("math", 2)).await.unwrap();

        let all = store.list(&PaperFilter::default()).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let math = store
            .list(&PaperFilter::new(Some("MATH"), None))
            .await
            .unwrap();
        assert_eq!(math.len(), 2);
    }

    #[tokio::test]
    async fn test_vote_not_found_messages() {
        let store = InMemoryPaperStore::new();
        let paper = store.create(new_paper("math", 1)).await.unwrap();

        let err = store
            .record_vote(Uuid::new_v4(), 0, Vote::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Paper not found"));

        let err = store.record_vote(paper.id, 1, Vote::Up).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "File not found"));

        let stored = store.get(paper.id).await.unwrap().unwrap();
        assert_eq!(stored.files[0].upvotes, 0);
    }

    #[tokio::test]
    async fn test_concurrent_votes_are_not_lost() {
        let store = Arc::new(InMemoryPaperStore::new());
        let paper = store.create(new_paper("math", 2)).await.unwrap();
        let id = paper.id;

        let votes = (0..50).map(|i| {
            let store = store.clone();
            let vote = if i % 5 == 0 { Vote::Down } else { Vote::Up };
            tokio::spawn(async move { store.record_vote(id, 1, vote).await })
        });
        for result in futures::future::join_all(votes).await {
            result.unwrap().unwrap();
        }

        let stored = store.get(paper.id).await.unwrap().unwrap();
        assert_eq!(stored.files[1].upvotes, 40);
        assert_eq!(stored.files[1].downvotes, 10);
        assert_eq!(stored.files[0].upvotes + stored.files[0].downvotes, 0);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let store = InMemoryPaperStore::new();
        let paper = store.create(new_paper("math", 1)).await.unwrap();
        assert!(store.delete(paper.id).await.unwrap());
        assert!(!store.delete(paper.id).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_subjects_sorted_and_unique_case_insensitive() {
        let store = InMemorySubjectStore::new();
        store.create("physics").await.unwrap();
        store.create("chemistry").await.unwrap();
        let err = store.create(" Physics ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Subject already exists"));

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["chemistry", "physics"]);
    }
}

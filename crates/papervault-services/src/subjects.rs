use std::sync::Arc;

use papervault_core::{AppError, CreateSubjectRequest, Subject};
use papervault_db::SubjectStore;
use validator::Validate;

#[derive(Clone)]
pub struct SubjectService {
    store: Arc<dyn SubjectStore>,
}

impl SubjectService {
    pub fn new(store: Arc<dyn SubjectStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Subject>, AppError> {
        self.store.list().await
    }

    pub async fn create(&self, request: CreateSubjectRequest) -> Result<Subject, AppError> {
        let request = CreateSubjectRequest {
            name: request.name.trim().to_string(),
        };
        if request.name.is_empty() {
            return Err(AppError::InvalidInput("Subject name is required".to_string()));
        }
        request.validate()?;

        let subject = self.store.create(&request.name).await?;
        tracing::info!(subject = %subject.name, "Subject created");
        Ok(subject)
    }
}

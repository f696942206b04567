use std::sync::Arc;

use papervault_core::{AppError, CreateFeedbackRequest, Feedback};
use papervault_db::FeedbackStore;
use validator::Validate;

#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Store a feedback message. The email is optional and saved as "" when absent.
    pub async fn submit(&self, request: CreateFeedbackRequest) -> Result<Feedback, AppError> {
        let request = CreateFeedbackRequest {
            message: request.message.trim().to_string(),
            email: request.email.map(|e| e.trim().to_string()),
        };
        if request.message.is_empty() {
            return Err(AppError::InvalidInput("Message is required".to_string()));
        }
        request.validate()?;

        let email = request.email.as_deref().unwrap_or_default();
        let feedback = self.store.create(&request.message, email).await?;
        tracing::info!(feedback_id = %feedback.id, "Feedback received");
        Ok(feedback)
    }
}

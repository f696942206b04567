use async_trait::async_trait;
use papervault_core::{AppError, Feedback};
use sqlx::{PgPool, Postgres};

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn create(&self, message: &str, email: &str) -> Result<Feedback, AppError>;
}

#[derive(Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for FeedbackRepository {
    #[tracing::instrument(skip(self, message, email), fields(db.table = "feedback", db.operation = "insert"))]
    async fn create(&self, message: &str, email: &str) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<Postgres, Feedback>(
            r#"
            INSERT INTO feedback (message, email)
            VALUES ($1, $2)
            RETURNING id, message, email, created_at
            "#,
        )
        .bind(message)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }
}

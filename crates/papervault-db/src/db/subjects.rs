use async_trait::async_trait;
use papervault_core::{AppError, Subject};
use sqlx::{PgPool, Postgres};

#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// All subjects sorted by name
    async fn list(&self) -> Result<Vec<Subject>, AppError>;

    /// Fails with `InvalidInput("Subject already exists")` on a case-insensitive duplicate.
    async fn create(&self, name: &str) -> Result<Subject, AppError>;
}

pub(crate) fn subject_exists() -> AppError {
    AppError::InvalidInput("Subject already exists".to_string())
}

#[derive(Clone)]
pub struct SubjectRepository {
    pool: PgPool,
}

impl SubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectStore for SubjectRepository {
    #[tracing::instrument(skip(self), fields(db.table = "subjects", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Subject>, AppError> {
        let subjects = sqlx::query_as::<Postgres, Subject>(
            "SELECT id, name, created_at FROM subjects ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    #[tracing::instrument(skip(self), fields(db.table = "subjects", db.operation = "insert"))]
    async fn create(&self, name: &str) -> Result<Subject, AppError> {
        let result = sqlx::query_as::<Postgres, Subject>(
            r#"
            INSERT INTO subjects (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(subject) => Ok(subject),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(subject_exists())
            }
            Err(e) => Err(e.into()),
        }
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use papervault_core::{AppError, NewPaper, Paper, PaperFile, PaperFilter, Vote};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

/// Persistence for papers and their embedded files.
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Insert a paper with its files in one write.
    async fn create(&self, paper: NewPaper) -> Result<Paper, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Paper>, AppError>;

    /// Papers matching `filter`, newest first. No visibility rules applied.
    async fn list(&self, filter: &PaperFilter) -> Result<Vec<Paper>, AppError>;

    /// Remove the paper row. Returns `false` when it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Atomically add one to a file counter and return the updated file.
    ///
    /// Fails with `NotFound` ("Paper not found" / "File not found") without
    /// touching anything when the paper or index does not exist.
    async fn record_vote(&self, id: Uuid, index: usize, vote: Vote)
        -> Result<PaperFile, AppError>;

    /// Connectivity check for health endpoints
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct PaperRow {
    id: Uuid,
    subject: String,
    semester: String,
    description: String,
    files: Json<Vec<PaperFile>>,
    created_at: DateTime<Utc>,
}

impl From<PaperRow> for Paper {
    fn from(row: PaperRow) -> Self {
        Paper {
            id: row.id,
            subject: row.subject,
            semester: row.semester,
            description: row.description,
            files: row.files.0,
            created_at: row.created_at,
        }
    }
}

pub(crate) fn paper_not_found() -> AppError {
    AppError::NotFound("Paper not found".to_string())
}

pub(crate) fn file_not_found() -> AppError {
    AppError::NotFound("File not found".to_string())
}

/// Postgres-backed paper repository
#[derive(Clone)]
pub struct PaperRepository {
    pool: PgPool,
}

impl PaperRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaperStore for PaperRepository {
    #[tracing::instrument(skip(self, paper), fields(db.table = "papers", db.operation = "insert", files = paper.files.len()))]
    async fn create(&self, paper: NewPaper) -> Result<Paper, AppError> {
        let row = sqlx::query_as::<Postgres, PaperRow>(
            r#"
            INSERT INTO papers (subject, semester, description, files)
            VALUES ($1, $2, $3, $4)
            RETURNING id, subject, semester, description, files, created_at
            "#,
        )
        .bind(&paper.subject)
        .bind(&paper.semester)
        .bind(&paper.description)
        .bind(Json(&paper.files))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "papers", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<Paper>, AppError> {
        let row = sqlx::query_as::<Postgres, PaperRow>(
            "SELECT id, subject, semester, description, files, created_at FROM papers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Paper::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "papers", db.operation = "select"))]
    async fn list(&self, filter: &PaperFilter) -> Result<Vec<Paper>, AppError> {
        let rows = sqlx::query_as::<Postgres, PaperRow>(
            r#"
            SELECT id, subject, semester, description, files, created_at
            FROM papers
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::text IS NULL OR semester = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.subject.as_deref())
        .bind(filter.semester.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Paper::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "papers", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM papers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "papers", db.operation = "update"))]
    async fn record_vote(
        &self,
        id: Uuid,
        index: usize,
        vote: Vote,
    ) -> Result<PaperFile, AppError> {
        let Ok(position) = i32::try_from(index) else {
            return Err(file_not_found());
        };
        let path = vec![index.to_string(), vote.counter_field().to_string()];

        // Single statement: the row lock serializes concurrent votes and the
        // increment is computed from the locked row, so no update is lost.
        let updated = sqlx::query_scalar::<Postgres, Json<PaperFile>>(
            r#"
            UPDATE papers
            SET files = jsonb_set(
                files,
                $3::text[],
                to_jsonb(COALESCE((files #>> $3::text[])::bigint, 0) + 1)
            )
            WHERE id = $1 AND $2 < jsonb_array_length(files)
            RETURNING files -> $2
            "#,
        )
        .bind(id)
        .bind(position)
        .bind(&path)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(Json(file)) = updated {
            return Ok(file);
        }

        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM papers WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Err(if exists {
            file_not_found()
        } else {
            paper_not_found()
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

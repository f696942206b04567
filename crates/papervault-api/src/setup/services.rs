//! Service initialization and application state setup

use anyhow::Result;
use papervault_core::Config;
use papervault_db::{FeedbackRepository, PaperRepository, SubjectRepository};
use papervault_services::{create_moderation_gate, Storage};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::{AppState, Stores};

/// Wire the Postgres repositories, storage and moderation into the application state
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let stores = Stores {
        papers: Arc::new(PaperRepository::new(pool.clone())),
        feedback: Arc::new(FeedbackRepository::new(pool.clone())),
        subjects: Arc::new(SubjectRepository::new(pool)),
    };
    let moderation = create_moderation_gate(config).await?;

    tracing::info!(
        max_files_per_upload = config.max_files_per_upload(),
        max_concurrent_files = config.ingest_max_concurrent_files(),
        image_max_width = config.image_max_width(),
        image_jpeg_quality = config.image_jpeg_quality(),
        pdf_compression = config.pdf_compression_enabled(),
        "Ingestion pipeline configured"
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        stores,
        storage,
        moderation,
    )))
}

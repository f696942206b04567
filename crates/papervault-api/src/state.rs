//! Application state shared by every handler.
//!
//! AppState is split into domain sub-states so handlers reach only the part they
//! need, and so tests can assemble it from in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use papervault_core::Config;
use papervault_db::{FeedbackStore, PaperStore, SubjectStore};
use papervault_services::{
    FeedbackService, IngestionPipeline, ModerationGate, PaperService, Storage, StorageUploader,
    SubjectService, VoteLedger,
};

/// The three persistence seams, Postgres in production and in-memory in tests.
#[derive(Clone)]
pub struct Stores {
    pub papers: Arc<dyn PaperStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub subjects: Arc<dyn SubjectStore>,
}

/// Paper reads, votes and admin operations.
#[derive(Clone)]
pub struct PaperState {
    pub store: Arc<dyn PaperStore>,
    pub service: PaperService,
    pub votes: VoteLedger,
}

/// Shared admin credential. Both halves unset means admin routes are closed.
#[derive(Clone, Default)]
pub struct SecurityConfig {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub papers: PaperState,
    pub ingest: Arc<IngestionPipeline>,
    pub feedback: FeedbackService,
    pub subjects: SubjectService,
    pub storage: Arc<dyn Storage>,
    pub security: SecurityConfig,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        storage: Arc<dyn Storage>,
        moderation: Arc<dyn ModerationGate>,
    ) -> Self {
        let storage_timeout = Duration::from_secs(config.storage_timeout_seconds());
        let uploader = StorageUploader::new(
            storage.clone(),
            config.storage_upload_retries(),
            storage_timeout,
        );
        let ingest =
            IngestionPipeline::from_config(&config, stores.papers.clone(), uploader, moderation);

        let security = SecurityConfig {
            admin_username: config.admin_username().map(str::to_string),
            admin_password: config.admin_password().map(str::to_string),
        };

        AppState {
            papers: PaperState {
                store: stores.papers.clone(),
                service: PaperService::new(stores.papers.clone(), storage.clone(), storage_timeout),
                votes: VoteLedger::new(stores.papers),
            },
            ingest: Arc::new(ingest),
            feedback: FeedbackService::new(stores.feedback),
            subjects: SubjectService::new(stores.subjects),
            storage,
            security,
            config,
        }
    }
}

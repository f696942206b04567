//! PaperVault Services Layer
//!
//! This crate is the **business service layer**: the ingestion pipeline, the
//! moderation gates, the vote ledger and the read/admin services over papers,
//! feedback and subjects. It re-exports what the API crate needs from storage
//! and processing so handlers depend on a single service facade. Keep thin
//! HTTP handling in papervault-api.

pub mod feedback;
pub mod ingest;
pub mod moderation;
pub mod papers;
pub mod subjects;
pub mod votes;

pub use feedback::FeedbackService;
pub use ingest::{IncomingFile, IngestionPipeline, IngestionReport, IngestionRequest};
#[cfg(feature = "aws-rekognition")]
pub use moderation::RekognitionModeration;
pub use moderation::{
    create_moderation_gate, DisabledModeration, HttpModerationClient, ModerationError,
    ModerationGate, Verdict,
};
pub use papers::PaperService;
pub use papervault_processing::{MediaValidator, PayloadCompressor};
pub use papervault_storage::{
    create_storage, LocalStorage, S3Storage, Storage, StorageBackend, StorageError,
    StorageResult, StorageUploader,
};
pub use subjects::SubjectService;
pub use votes::VoteLedger;

//! PaperVault Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! vote-driven visibility policy shared across all PaperVault components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod visibility;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ModerationProvider, PaperVaultConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    normalize_subject, CreateFeedbackRequest, CreateSubjectRequest, Feedback, FileKind, NewPaper,
    Paper, PaperFile, PaperFileResponse, PaperFilter, PaperResponse, SkipReason, SkippedFile, Subject,
    Vote,
};
pub use storage_types::StorageBackend;
pub use visibility::{filter_visible, is_visible, DOWNVOTE_THRESHOLD};

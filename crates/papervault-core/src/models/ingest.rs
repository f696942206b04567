use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a submitted file was left out of its paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Empty, too large, or an unusable filename
    InvalidFile,
    ModerationRejected,
    /// Moderation could not be reached and the gate fails closed
    ModerationUnavailable,
    StorageFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidFile => "invalid_file",
            SkipReason::ModerationRejected => "moderation_rejected",
            SkipReason::ModerationUnavailable => "moderation_unavailable",
            SkipReason::StorageFailed => "storage_failed",
        }
    }
}

/// A discarded file, reported back to the submitter by its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SkippedFile {
    pub index: usize,
    pub filename: String,
    pub reason: SkipReason,
    pub detail: String,
}

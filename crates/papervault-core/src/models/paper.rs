use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Coarse payload kind; decides which moderation and compression steps apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Other,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
            FileKind::Other => "other",
        }
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One stored payload of a paper, with its vote counters.
///
/// Files are embedded in their paper; `storage_key` is what the storage backend
/// needs to release the payload when the paper is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperFile {
    pub url: String,
    pub storage_key: String,
    pub kind: FileKind,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
}

impl PaperFile {
    /// A freshly stored file with both counters at zero.
    pub fn stored(
        url: String,
        storage_key: String,
        kind: FileKind,
        original_filename: String,
        content_type: String,
        size_bytes: u64,
    ) -> Self {
        PaperFile {
            url,
            storage_key,
            kind,
            original_filename,
            content_type,
            size_bytes,
            upvotes: 0,
            downvotes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: Uuid,
    pub subject: String,
    pub semester: String,
    pub description: String,
    pub files: Vec<PaperFile>,
    pub created_at: DateTime<Utc>,
}

impl Paper {
    pub fn storage_keys(&self) -> Vec<String> {
        self.files.iter().map(|f| f.storage_key.clone()).collect()
    }
}

/// Which counter of a file a vote increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Name of the counter field in a stored file.
    pub fn counter_field(&self) -> &'static str {
        match self {
            Vote::Up => "upvotes",
            Vote::Down => "downvotes",
        }
    }
}

impl PaperFile {
    /// Apply one vote. Counters only ever move by exactly one.
    pub fn record_vote(&mut self, vote: Vote) {
        match vote {
            Vote::Up => self.upvotes = self.upvotes.saturating_add(1),
            Vote::Down => self.downvotes = self.downvotes.saturating_add(1),
        }
    }
}

/// Optional listing filters. `subject` is normalized before comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    pub subject: Option<String>,
    pub semester: Option<String>,
}

impl PaperFilter {
    pub fn new(subject: Option<&str>, semester: Option<&str>) -> Self {
        PaperFilter {
            subject: subject
                .map(normalize_subject)
                .filter(|s| !s.is_empty()),
            semester: semester
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, paper: &Paper) -> bool {
        self.subject.as_ref().map_or(true, |s| &paper.subject == s)
            && self.semester.as_ref().map_or(true, |s| &paper.semester == s)
    }
}

/// Paper as handed to the store for insertion. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub subject: String,
    pub semester: String,
    pub description: String,
    pub files: Vec<PaperFile>,
}

/// Trim and lowercase a subject so that storage and lookups agree.
pub fn normalize_subject(subject: &str) -> String {
    subject.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaperFileResponse {
    /// Position of the file inside its paper; votes address files by this index.
    pub index: usize,
    pub url: String,
    pub kind: FileKind,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub upvotes: u64,
    pub downvotes: u64,
}

impl PaperFileResponse {
    pub fn new(index: usize, file: PaperFile) -> Self {
        PaperFileResponse {
            index,
            url: file.url,
            kind: file.kind,
            filename: file.original_filename,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            upvotes: file.upvotes,
            downvotes: file.downvotes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaperResponse {
    pub id: Uuid,
    pub subject: String,
    pub semester: String,
    pub description: String,
    pub files: Vec<PaperFileResponse>,
    pub uploaded_at: DateTime<Utc>,
}

/// Unfiltered view with stored indices. Readers get it through
/// [`crate::visibility::filter_visible`].
impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        PaperResponse {
            id: paper.id,
            subject: paper.subject,
            semester: paper.semester,
            description: paper.description,
            files: paper
                .files
                .into_iter()
                .enumerate()
                .map(|(index, file)| PaperFileResponse::new(index, file))
                .collect(),
            uploaded_at: paper.created_at,
        }
    }
}

//! Submission ingestion.
//!
//! Every file runs `classify -> moderate -> compress -> store` on its own and
//! ends either accepted or discarded. Files run concurrently but carry their
//! submission index, so the paper keeps the order they were sent in. Only a
//! backend-level storage failure aborts the whole submission; anything stored
//! by then is released again.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use papervault_core::{
    normalize_subject, AppError, Config, FileKind, NewPaper, Paper, PaperFile, SkipReason,
    SkippedFile,
};
use papervault_db::PaperStore;
use papervault_processing::{classify, file_extension, sanitize_filename, MediaValidator, PayloadCompressor};
use papervault_storage::{StorageError, StorageUploader};

use crate::moderation::ModerationGate;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct IngestionRequest {
    pub subject: String,
    pub semester: String,
    pub description: String,
    pub files: Vec<IncomingFile>,
}

#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub paper: Paper,
    pub skipped: Vec<SkippedFile>,
}

enum FileOutcome {
    Accepted(PaperFile),
    Skipped(SkipReason, String),
    Fatal(StorageError),
}

pub struct IngestionPipeline {
    store: Arc<dyn PaperStore>,
    uploader: StorageUploader,
    moderation: Arc<dyn ModerationGate>,
    compressor: PayloadCompressor,
    validator: MediaValidator,
    max_files: usize,
    max_concurrent_files: usize,
    moderation_fail_closed: bool,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn PaperStore>,
        uploader: StorageUploader,
        moderation: Arc<dyn ModerationGate>,
        compressor: PayloadCompressor,
        validator: MediaValidator,
    ) -> Self {
        Self {
            store,
            uploader,
            moderation,
            compressor,
            validator,
            max_files: 20,
            max_concurrent_files: 4,
            moderation_fail_closed: true,
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn PaperStore>,
        uploader: StorageUploader,
        moderation: Arc<dyn ModerationGate>,
    ) -> Self {
        let compressor = PayloadCompressor::from_settings(
            config.image_max_width(),
            config.image_jpeg_quality(),
            config.pdf_compression_enabled(),
        );
        Self::new(
            store,
            uploader,
            moderation,
            compressor,
            MediaValidator::new(config.max_file_size_bytes()),
        )
        .with_limits(
            config.max_files_per_upload(),
            config.ingest_max_concurrent_files(),
        )
        .with_moderation_fail_closed(config.moderation_fail_closed())
    }

    pub fn with_limits(mut self, max_files: usize, max_concurrent_files: usize) -> Self {
        self.max_files = max_files.max(1);
        self.max_concurrent_files = max_concurrent_files.max(1);
        self
    }

    /// When false, images whose moderation call fails are accepted unchecked.
    pub fn with_moderation_fail_closed(mut self, fail_closed: bool) -> Self {
        self.moderation_fail_closed = fail_closed;
        self
    }

    /// Run a submission through the pipeline and persist the resulting paper.
    #[tracing::instrument(skip(self, request), fields(files = request.files.len()))]
    pub async fn ingest(&self, request: IngestionRequest) -> Result<IngestionReport, AppError> {
        let start = Instant::now();

        if request.files.is_empty() {
            return Err(AppError::InvalidInput("No files uploaded.".to_string()));
        }
        if request.files.len() > self.max_files {
            return Err(AppError::InvalidInput(format!(
                "Too many files: at most {} per upload",
                self.max_files
            )));
        }
        let subject = normalize_subject(&request.subject);
        if subject.is_empty() {
            return Err(AppError::InvalidInput("Subject is required".to_string()));
        }
        let semester = request.semester.trim().to_string();
        if semester.is_empty() {
            return Err(AppError::InvalidInput("Semester is required".to_string()));
        }

        let subject_ref = subject.as_str();
        let mut outcomes: Vec<(usize, String, FileOutcome)> =
            stream::iter(request.files.into_iter().enumerate())
                .map(|(index, file)| async move {
                    let filename = sanitize_filename(&file.filename);
                    let outcome = self.process_file(index, &filename, file, subject_ref).await;
                    (index, filename, outcome)
                })
                .buffer_unordered(self.max_concurrent_files)
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut accepted = Vec::new();
        let mut skipped = Vec::new();
        let mut fatal = None;
        for (index, filename, outcome) in outcomes {
            match outcome {
                FileOutcome::Accepted(file) => accepted.push(file),
                FileOutcome::Skipped(reason, detail) => skipped.push(SkippedFile {
                    index,
                    filename,
                    reason,
                    detail,
                }),
                FileOutcome::Fatal(err) => {
                    if fatal.is_none() {
                        fatal = Some(err);
                    }
                }
            }
        }
        let stored_keys: Vec<String> = accepted.iter().map(|f| f.storage_key.clone()).collect();

        if let Some(err) = fatal {
            tracing::error!(
                error = %err,
                released = stored_keys.len(),
                "Storage unavailable, submission aborted"
            );
            self.uploader.release(&stored_keys).await;
            return Err(AppError::Storage(err.to_string()));
        }

        if accepted.is_empty()
            && !skipped.is_empty()
            && skipped.iter().all(|s| s.reason == SkipReason::StorageFailed)
        {
            tracing::error!(
                skipped = skipped.len(),
                "Every upload of the submission failed"
            );
            return Err(AppError::Storage(format!(
                "Failed to store any of {} files",
                skipped.len()
            )));
        }

        if accepted.is_empty() {
            tracing::info!(skipped = skipped.len(), "No file of the submission was accepted");
            return Err(AppError::InvalidInput(
                "No files could be accepted".to_string(),
            ));
        }

        let new_paper = NewPaper {
            subject,
            semester,
            description: request.description.trim().to_string(),
            files: accepted,
        };

        let paper = match self.store.create(new_paper).await {
            Ok(paper) => paper,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    released = stored_keys.len(),
                    "Failed to persist paper, releasing stored payloads"
                );
                self.uploader.release(&stored_keys).await;
                return Err(err);
            }
        };

        tracing::info!(
            paper_id = %paper.id,
            subject = %paper.subject,
            accepted = paper.files.len(),
            skipped = skipped.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Paper ingested"
        );

        Ok(IngestionReport { paper, skipped })
    }

    async fn process_file(
        &self,
        index: usize,
        filename: &str,
        file: IncomingFile,
        folder: &str,
    ) -> FileOutcome {
        if let Err(e) = self.validator.validate_all(filename, file.data.len()) {
            tracing::info!(index, filename, error = %e, "File failed validation");
            return FileOutcome::Skipped(SkipReason::InvalidFile, e.to_string());
        }

        let kind = classify(filename, &file.content_type);

        if kind == FileKind::Image {
            match self.moderation.assess(&file.data).await {
                Ok(verdict) if verdict.reject => {
                    tracing::info!(index, filename, score = verdict.score, "Image rejected by moderation");
                    return FileOutcome::Skipped(
                        SkipReason::ModerationRejected,
                        "Content rejected by moderation".to_string(),
                    );
                }
                Ok(_) => {}
                Err(e) if self.moderation_fail_closed => {
                    tracing::warn!(index, filename, error = %e, "Moderation unavailable, discarding image");
                    return FileOutcome::Skipped(SkipReason::ModerationUnavailable, e.to_string());
                }
                Err(e) => {
                    tracing::warn!(index, filename, error = %e, "Moderation unavailable, accepting image unchecked");
                }
            }
        }

        let outcome = self.compressor.compress(file.data, kind).await;

        let extension = outcome
            .extension
            .map(str::to_string)
            .or_else(|| file_extension(filename))
            .unwrap_or_else(|| "bin".to_string());
        let content_type = outcome
            .content_type
            .map(str::to_string)
            .or_else(|| Some(file.content_type.trim().to_string()).filter(|c| !c.is_empty()))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let stored_name = match outcome.extension {
            Some(ext) => replace_extension(filename, ext),
            None => filename.to_string(),
        };

        match self
            .uploader
            .store(outcome.data, folder, &extension, &content_type)
            .await
        {
            Ok(stored) => FileOutcome::Accepted(PaperFile::stored(
                stored.url,
                stored.key,
                kind,
                stored_name,
                content_type,
                stored.size_bytes,
            )),
            Err(e) if e.is_fatal() => FileOutcome::Fatal(e),
            Err(e) => FileOutcome::Skipped(SkipReason::StorageFailed, e.to_string()),
        }
    }
}

fn replace_extension(filename: &str, extension: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    format!("{}.{}", stem, extension)
}

use std::path::Path;

/// Per-file validation errors. A failing file is skipped, not the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

const MAX_FILENAME_LEN: usize = 255;

/// Submitted file validator
pub struct MediaValidator {
    max_file_size: usize,
}

impl MediaValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the declared filename (after [`sanitize_filename`]).
    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }
        if filename.len() > MAX_FILENAME_LEN {
            return Err(ValidationError::InvalidFilename(format!(
                "{}... (longer than {} bytes)",
                filename.chars().take(32).collect::<String>(),
                MAX_FILENAME_LEN
            )));
        }
        if filename.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidFilename(filename.escape_debug().to_string()));
        }
        Ok(())
    }

    pub fn validate_all(&self, filename: &str, file_size: usize) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_filename(filename)?;
        Ok(())
    }
}

/// Keep only the final path component of a client-supplied filename.
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

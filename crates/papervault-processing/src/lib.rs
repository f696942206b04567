//! PaperVault Processing Library
//!
//! CPU-side handling of submitted payloads: kind detection, per-file
//! validation and size optimization.

pub mod classifier;
pub mod compression;
pub mod validator;

pub use classifier::{classify, file_extension};
pub use compression::{
    CompressionError, CompressionOutcome, Compressor, PayloadCompressor,
};
#[cfg(feature = "image")]
pub use compression::ImageCompressor;
#[cfg(feature = "pdf")]
pub use compression::PdfCompressor;
pub use validator::{sanitize_filename, MediaValidator, ValidationError};

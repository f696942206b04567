//! PaperVault Storage Library
//!
//! Storage abstraction for paper payloads, with local filesystem and S3
//! implementations selected at configuration time.
//!
//! # Storage key format
//!
//! Keys are scoped by subject: `papers/{subject-slug}/{uuid}.{ext}`. Keys must
//! not contain `..` or a leading `/`. Key generation lives in the `keys` module
//! so every backend uses the same layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod uploader;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use papervault_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use uploader::{StorageUploader, StoredObject};

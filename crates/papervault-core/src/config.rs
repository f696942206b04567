//! Configuration module
//!
//! Configuration is read once at process start from the environment (and an
//! optional `.env` file) and passed explicitly to every component that needs it.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 25;
const MAX_FILES_PER_UPLOAD: usize = 20;
const MODERATION_THRESHOLD: f64 = 0.6;
const MODERATION_TIMEOUT_SECS: u64 = 10;
const IMAGE_MAX_WIDTH: u32 = 1200;
const IMAGE_JPEG_QUALITY: u8 = 70;
const STORAGE_UPLOAD_RETRIES: u32 = 2;
const STORAGE_TIMEOUT_SECS: u64 = 30;
const INGEST_MAX_CONCURRENT_FILES: usize = 4;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Which content classifier backs the moderation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationProvider {
    /// JSON-over-HTTP classifier at `MODERATION_ENDPOINT`
    Http,
    /// AWS Rekognition DetectModerationLabels
    Rekognition,
    /// Every image passes
    Disabled,
}

impl FromStr for ModerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(ModerationProvider::Http),
            "rekognition" | "aws" => Ok(ModerationProvider::Rekognition),
            "disabled" | "none" | "off" => Ok(ModerationProvider::Disabled),
            _ => Err(anyhow::anyhow!("Invalid moderation provider: {}", s)),
        }
    }
}

impl Display for ModerationProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ModerationProvider::Http => write!(f, "http"),
            ModerationProvider::Rekognition => write!(f, "rekognition"),
            ModerationProvider::Disabled => write!(f, "disabled"),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    /// In-flight request cap for the whole router
    pub http_concurrency_limit: usize,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            environment: "development".to_string(),
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
        }
    }
}

/// Full PaperVault configuration
#[derive(Clone, Debug)]
pub struct PaperVaultConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub storage_upload_retries: u32,
    pub storage_timeout_seconds: u64,
    // Shared admin credential
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    // Moderation
    pub moderation_provider: ModerationProvider,
    pub moderation_endpoint: Option<String>,
    pub moderation_api_key: Option<String>,
    pub moderation_threshold: f64,
    pub moderation_timeout_seconds: u64,
    /// Discard an image when the classifier cannot be reached.
    pub moderation_fail_closed: bool,
    // Compression
    pub image_max_width: u32,
    pub image_jpeg_quality: u8,
    pub pdf_compression_enabled: bool,
    // Ingestion limits
    pub max_file_size_bytes: usize,
    pub max_files_per_upload: usize,
    pub ingest_max_concurrent_files: usize,
}

impl Default for PaperVaultConfig {
    fn default() -> Self {
        PaperVaultConfig {
            base: BaseConfig::default(),
            database_url: String::new(),
            storage_backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            storage_upload_retries: STORAGE_UPLOAD_RETRIES,
            storage_timeout_seconds: STORAGE_TIMEOUT_SECS,
            admin_username: None,
            admin_password: None,
            moderation_provider: ModerationProvider::Disabled,
            moderation_endpoint: None,
            moderation_api_key: None,
            moderation_threshold: MODERATION_THRESHOLD,
            moderation_timeout_seconds: MODERATION_TIMEOUT_SECS,
            moderation_fail_closed: true,
            image_max_width: IMAGE_MAX_WIDTH,
            image_jpeg_quality: IMAGE_JPEG_QUALITY,
            pdf_compression_enabled: true,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files_per_upload: MAX_FILES_PER_UPLOAD,
            ingest_max_concurrent_files: INGEST_MAX_CONCURRENT_FILES,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PaperVaultConfig>);

impl Config {
    fn inner(&self) -> &PaperVaultConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PaperVaultConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit.max(1)
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn storage_upload_retries(&self) -> u32 {
        self.inner().storage_upload_retries
    }

    pub fn storage_timeout_seconds(&self) -> u64 {
        self.inner().storage_timeout_seconds
    }

    pub fn admin_username(&self) -> Option<&str> {
        self.inner().admin_username.as_deref()
    }

    pub fn admin_password(&self) -> Option<&str> {
        self.inner().admin_password.as_deref()
    }

    pub fn moderation_provider(&self) -> ModerationProvider {
        self.inner().moderation_provider
    }

    pub fn moderation_endpoint(&self) -> Option<&str> {
        self.inner().moderation_endpoint.as_deref()
    }

    pub fn moderation_api_key(&self) -> Option<&str> {
        self.inner().moderation_api_key.as_deref()
    }

    pub fn moderation_threshold(&self) -> f64 {
        self.inner().moderation_threshold
    }

    pub fn moderation_timeout_seconds(&self) -> u64 {
        self.inner().moderation_timeout_seconds
    }

    pub fn moderation_fail_closed(&self) -> bool {
        self.inner().moderation_fail_closed
    }

    pub fn image_max_width(&self) -> u32 {
        self.inner().image_max_width
    }

    pub fn image_jpeg_quality(&self) -> u8 {
        self.inner().image_jpeg_quality
    }

    pub fn pdf_compression_enabled(&self) -> bool {
        self.inner().pdf_compression_enabled
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn max_files_per_upload(&self) -> usize {
        self.inner().max_files_per_upload
    }

    pub fn ingest_max_concurrent_files(&self) -> usize {
        self.inner().ingest_max_concurrent_files
    }
}

impl PaperVaultConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) => Some(s.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let moderation_endpoint = env::var("MODERATION_ENDPOINT").ok();
        let moderation_provider = match env::var("MODERATION_PROVIDER") {
            Ok(s) => s.parse::<ModerationProvider>()?,
            Err(_) if moderation_endpoint.is_some() => ModerationProvider::Http,
            Err(_) => ModerationProvider::Disabled,
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = PaperVaultConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            storage_upload_retries: env::var("STORAGE_UPLOAD_RETRIES")
                .unwrap_or_else(|_| STORAGE_UPLOAD_RETRIES.to_string())
                .parse()
                .unwrap_or(STORAGE_UPLOAD_RETRIES),
            storage_timeout_seconds: env::var("STORAGE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| STORAGE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(STORAGE_TIMEOUT_SECS),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            moderation_provider,
            moderation_endpoint,
            moderation_api_key: env::var("MODERATION_API_KEY").ok(),
            moderation_threshold: env::var("MODERATION_THRESHOLD")
                .unwrap_or_else(|_| MODERATION_THRESHOLD.to_string())
                .parse()
                .unwrap_or(MODERATION_THRESHOLD),
            moderation_timeout_seconds: env::var("MODERATION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| MODERATION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MODERATION_TIMEOUT_SECS),
            moderation_fail_closed: env::var("MODERATION_FAIL_CLOSED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            image_max_width: env::var("IMAGE_MAX_WIDTH")
                .unwrap_or_else(|_| IMAGE_MAX_WIDTH.to_string())
                .parse()
                .unwrap_or(IMAGE_MAX_WIDTH),
            image_jpeg_quality: env::var("IMAGE_JPEG_QUALITY")
                .unwrap_or_else(|_| IMAGE_JPEG_QUALITY.to_string())
                .parse()
                .unwrap_or(IMAGE_JPEG_QUALITY),
            pdf_compression_enabled: env::var("PDF_COMPRESSION_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_files_per_upload: env::var("MAX_FILES_PER_UPLOAD")
                .unwrap_or_else(|_| MAX_FILES_PER_UPLOAD.to_string())
                .parse()
                .unwrap_or(MAX_FILES_PER_UPLOAD),
            ingest_max_concurrent_files: env::var("INGEST_MAX_CONCURRENT_FILES")
                .unwrap_or_else(|_| INGEST_MAX_CONCURRENT_FILES.to_string())
                .parse()
                .unwrap_or(INGEST_MAX_CONCURRENT_FILES),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.admin_username.is_some() != self.admin_password.is_some() {
            return Err(anyhow::anyhow!(
                "ADMIN_USERNAME and ADMIN_PASSWORD must be set together"
            ));
        }

        if !(0.0..=1.0).contains(&self.moderation_threshold) {
            return Err(anyhow::anyhow!(
                "MODERATION_THRESHOLD must be between 0.0 and 1.0"
            ));
        }

        if self.moderation_provider == ModerationProvider::Http
            && self.moderation_endpoint.is_none()
        {
            return Err(anyhow::anyhow!(
                "MODERATION_ENDPOINT must be set when MODERATION_PROVIDER=http"
            ));
        }

        if self.image_max_width == 0 {
            return Err(anyhow::anyhow!("IMAGE_MAX_WIDTH must be greater than 0"));
        }

        if !(1..=100).contains(&self.image_jpeg_quality) {
            return Err(anyhow::anyhow!(
                "IMAGE_JPEG_QUALITY must be between 1 and 100"
            ));
        }

        if self.ingest_max_concurrent_files == 0 || self.max_files_per_upload == 0 {
            return Err(anyhow::anyhow!(
                "INGEST_MAX_CONCURRENT_FILES and MAX_FILES_PER_UPLOAD must be at least 1"
            ));
        }

        // Validate storage backend configuration
        let backend = self.storage_backend.unwrap_or(StorageBackend::Local);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

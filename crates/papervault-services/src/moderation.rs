//! Content moderation for image payloads.
//!
//! A gate returns an explicitness score in `[0, 1]`; the payload is rejected
//! when the score is strictly above the configured threshold. What happens when
//! the gate itself fails is decided by the caller (see `ModerationPolicy`).

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use papervault_core::{Config, ModerationProvider};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Moderation service timed out after {0}s")]
    Timeout(u64),

    #[error("Moderation request failed: {0}")]
    Request(String),

    #[error("Moderation service returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub reject: bool,
    pub score: f64,
}

impl Verdict {
    pub fn from_score(score: f64, threshold: f64) -> Self {
        let score = if score.is_nan() { 1.0 } else { score.clamp(0.0, 1.0) };
        Verdict {
            reject: score > threshold,
            score,
        }
    }

    pub fn pass() -> Self {
        Verdict {
            reject: false,
            score: 0.0,
        }
    }
}

#[async_trait]
pub trait ModerationGate: Send + Sync {
    async fn assess(&self, image: &Bytes) -> Result<Verdict, ModerationError>;

    fn name(&self) -> &'static str;
}

/// Accepts everything. Used when no classifier is configured.
pub struct DisabledModeration;

#[async_trait]
impl ModerationGate for DisabledModeration {
    async fn assess(&self, _image: &Bytes) -> Result<Verdict, ModerationError> {
        Ok(Verdict::pass())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: Option<f64>,
    nsfw: Option<f64>,
}

/// Posts the raw image to an external classifier and reads back a score.
///
/// The response is JSON with either a `score` or an `nsfw` field.
pub struct HttpModerationClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    threshold: f64,
    timeout: Duration,
}

impl HttpModerationClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        threshold: f64,
        timeout: Duration,
    ) -> Result<Self, ModerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModerationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            threshold,
            timeout,
        })
    }
}

#[async_trait]
impl ModerationGate for HttpModerationClient {
    async fn assess(&self, image: &Bytes) -> Result<Verdict, ModerationError> {
        let start = Instant::now();
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModerationError::Timeout(self.timeout.as_secs())
            } else {
                ModerationError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModerationError::Request(format!(
                "classifier responded with status {}",
                status
            )));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| ModerationError::InvalidResponse(e.to_string()))?;
        let score = body.score.or(body.nsfw).ok_or_else(|| {
            ModerationError::InvalidResponse("missing score field".to_string())
        })?;

        let verdict = Verdict::from_score(score, self.threshold);
        tracing::debug!(
            score = verdict.score,
            reject = verdict.reject,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image moderated"
        );
        Ok(verdict)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(feature = "aws-rekognition")]
pub use rekognition::RekognitionModeration;

#[cfg(feature = "aws-rekognition")]
mod rekognition {
    use super::*;
    use aws_config::BehaviorVersion;
    use aws_sdk_rekognition::primitives::Blob;
    use aws_sdk_rekognition::types::Image;
    use aws_sdk_rekognition::Client as RekognitionClient;

    /// AWS Rekognition DetectModerationLabels. The score is the highest label
    /// confidence scaled to `[0, 1]`.
    pub struct RekognitionModeration {
        client: RekognitionClient,
        threshold: f64,
        timeout: Duration,
    }

    impl RekognitionModeration {
        pub async fn new(region: &str, threshold: f64, timeout: Duration) -> Self {
            let config = aws_config::defaults(BehaviorVersion::latest())
                .region(aws_config::Region::new(region.to_string()))
                .load()
                .await;

            Self {
                client: RekognitionClient::new(&config),
                threshold,
                timeout,
            }
        }
    }

    #[async_trait]
    impl ModerationGate for RekognitionModeration {
        async fn assess(&self, image: &Bytes) -> Result<Verdict, ModerationError> {
            let request = self
                .client
                .detect_moderation_labels()
                .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
                .send();

            let response = tokio::time::timeout(self.timeout, request)
                .await
                .map_err(|_| ModerationError::Timeout(self.timeout.as_secs()))?
                .map_err(|e| ModerationError::Request(e.to_string()))?;

            let max_confidence = response
                .moderation_labels()
                .iter()
                .filter_map(|label| label.confidence())
                .fold(0.0f32, f32::max);

            Ok(Verdict::from_score(
                f64::from(max_confidence) / 100.0,
                self.threshold,
            ))
        }

        fn name(&self) -> &'static str {
            "rekognition"
        }
    }
}

/// Build the gate selected by configuration.
pub async fn create_moderation_gate(
    config: &Config,
) -> Result<Arc<dyn ModerationGate>, anyhow::Error> {
    let timeout = Duration::from_secs(config.moderation_timeout_seconds());
    let threshold = config.moderation_threshold();

    let gate: Arc<dyn ModerationGate> = match config.moderation_provider() {
        ModerationProvider::Http => {
            let endpoint = config.moderation_endpoint().ok_or_else(|| {
                anyhow::anyhow!("MODERATION_ENDPOINT is required for the http moderation provider")
            })?;
            Arc::new(HttpModerationClient::new(
                endpoint,
                config.moderation_api_key().map(str::to_string),
                threshold,
                timeout,
            )?)
        }
        #[cfg(feature = "aws-rekognition")]
        ModerationProvider::Rekognition => {
            let region = config
                .aws_region()
                .or(config.s3_region())
                .unwrap_or("us-east-1");
            Arc::new(RekognitionModeration::new(region, threshold, timeout).await)
        }
        #[cfg(not(feature = "aws-rekognition"))]
        ModerationProvider::Rekognition => {
            anyhow::bail!(
                "MODERATION_PROVIDER=rekognition requires the aws-rekognition feature"
            )
        }
        ModerationProvider::Disabled => {
            tracing::warn!("Content moderation is disabled, images are accepted unchecked");
            Arc::new(DisabledModeration)
        }
    };

    tracing::info!(
        provider = gate.name(),
        threshold,
        fail_closed = config.moderation_fail_closed(),
        "Moderation gate initialized"
    );
    Ok(gate)
}

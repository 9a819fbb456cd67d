use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use sentix_models::{Classification, ClassifierConfig, SentimentLabel};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::credentials::{http_client, resolve_credential, HF_TOKEN_VAR};
use crate::error::{ClassifierError, ConfigError};

pub const HF_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// Assigns a sentiment label and confidence to a block of text.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

/// Bounded retry for the inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First wait while the model is loading. Doubles per attempt.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Flat wait after a network failure.
    pub network_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            network_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Wait after a "model loading" 503 on the zero-based `attempt`.
    pub fn loading_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn top(self) -> Option<LabelScore> {
        match self {
            InferenceResponse::Nested(outer) => outer.into_iter().next()?.into_iter().next(),
            InferenceResponse::Flat(candidates) => candidates.into_iter().next(),
        }
    }
}

/// Why a single attempt did not produce a classification.
enum AttemptFailure {
    ModelLoading,
    Network(String),
    Terminal(ClassifierError),
}

/// Classifier backed by a hosted Hugging Face text-classification model.
pub struct HuggingFaceClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
    retry: RetryPolicy,
    in_flight: Mutex<()>,
}

impl HuggingFaceClassifier {
    pub fn new(
        api_token: impl Into<String>,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::Invalid("classifier model is empty".to_string()));
        }
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), model.trim()),
            api_token: api_token.into(),
            retry: RetryPolicy::default(),
            in_flight: Mutex::new(()),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn attempt(&self, text: &str) -> Result<Classification, AttemptFailure> {
        let (status, body) = {
            let _guard = self.in_flight.lock().await;
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_token)
                .json(&serde_json::json!({ "inputs": text }))
                .send()
                .await
                .map_err(|e| AttemptFailure::Network(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| AttemptFailure::Network(e.to_string()))?;
            (status, body)
        };

        if status == StatusCode::SERVICE_UNAVAILABLE && body.contains("loading") {
            return Err(AttemptFailure::ModelLoading);
        }
        if !status.is_success() {
            return Err(AttemptFailure::Terminal(ClassifierError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let top = serde_json::from_str::<InferenceResponse>(&body)
            .map_err(|e| AttemptFailure::Terminal(ClassifierError::Decode(e.to_string())))?
            .top()
            .ok_or_else(|| {
                AttemptFailure::Terminal(ClassifierError::Decode(
                    "empty candidate list".to_string(),
                ))
            })?;

        Ok(Classification {
            label: SentimentLabel::from_provider_label(&top.label),
            score: top.score,
        })
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let attempts = self.retry.max_attempts.max(1);

        for attempt in 0..attempts {
            let last = attempt + 1 == attempts;
            match self.attempt(text).await {
                Ok(classification) => return Ok(classification),
                Err(AttemptFailure::Terminal(e)) => return Err(e),
                Err(AttemptFailure::ModelLoading) => {
                    if last {
                        break;
                    }
                    let wait = self.retry.loading_backoff(attempt);
                    debug!(
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        "Model loading, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(AttemptFailure::Network(message)) => {
                    if last {
                        return Err(ClassifierError::Transport(message));
                    }
                    warn!(attempt = attempt + 1, error = %message, "Inference request failed, retrying");
                    tokio::time::sleep(self.retry.network_delay).await;
                }
            }
        }

        Err(ClassifierError::Exhausted { attempts })
    }
}

/// Create the configured classifier. Fails if no API token is available.
pub fn build_classifier(
    config: &ClassifierConfig,
) -> Result<Arc<dyn SentimentClassifier>, ConfigError> {
    let api_token = resolve_credential(config.api_token.as_deref(), HF_TOKEN_VAR)?;
    let base_url = config.base_url.as_deref().unwrap_or(HF_INFERENCE_URL);
    let classifier = HuggingFaceClassifier::new(
        api_token,
        base_url,
        &config.model,
        Duration::from_secs(config.timeout_seconds),
    )?
    .with_retry(RetryPolicy {
        max_attempts: config.max_attempts,
        ..RetryPolicy::default()
    });
    Ok(Arc::new(classifier))
}

//! HuggingFace Inference API client for sentiment and zero-shot classification.
//!
//! This client uses HuggingFace's serverless inference endpoints.
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::traits::{ClassifyProvider, SentimentProvider};
use crate::types::{TextClassification, ZeroShotOptions, ZeroShotScores};
use crate::{HuginnError, Result};

/// Default base URL for HuggingFace Inference API
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for HuggingFace Inference API.
///
/// Supports:
/// - Text classification (sentiment models)
/// - Zero-shot classification, single- or multi-label
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and request timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Classify text with a text-classification model and return the best label.
    ///
    /// # Arguments
    /// * `text` - Text to classify
    /// * `model` - Full HuggingFace model ID (e.g., `cardiffnlp/twitter-roberta-base-sentiment-latest`)
    #[instrument(name = "huggingface.classify_text", skip(self, text), fields(model = %model))]
    pub async fn classify_text(&self, text: &str, model: &str) -> Result<TextClassification> {
        let url = format!("{}/models/{}", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&TextClassificationRequest { inputs: text })
            .send()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let response = check_response(response, model).await?;

        let result: TextClassificationResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        TextClassification::best(result.into_candidates()).ok_or(HuginnError::EmptyResponse)
    }

    /// Perform zero-shot classification.
    ///
    /// # Arguments
    /// * `text` - Text to classify
    /// * `labels` - Candidate labels
    /// * `options` - Hypothesis template and multi-label flag
    /// * `model` - Full HuggingFace model ID (e.g., `facebook/bart-large-mnli`)
    #[instrument(name = "huggingface.classify_zero_shot", skip(self, text, labels, options), fields(model = %model, labels = labels.len()))]
    pub async fn classify(
        &self,
        text: &str,
        labels: &[&str],
        options: &ZeroShotOptions,
        model: &str,
    ) -> Result<ZeroShotScores> {
        let url = format!("{}/models/{}", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ZeroShotRequest {
                inputs: text,
                parameters: ZeroShotParameters {
                    candidate_labels: labels.to_vec(),
                    multi_label: options.multi_label,
                    hypothesis_template: options.hypothesis_template.as_deref(),
                },
            })
            .send()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let response = check_response(response, model).await?;

        let result: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let scores = result.into_scores();
        if scores.labels.len() != scores.scores.len() {
            return Err(HuginnError::DataError(format!(
                "zero-shot response has {} labels but {} scores",
                scores.labels.len(),
                scores.scores.len()
            )));
        }
        if scores.is_empty() {
            return Err(HuginnError::EmptyResponse);
        }
        Ok(scores)
    }
}

/// Check response status and map to appropriate error.
///
/// Client errors the API explains (400, 422) become `InvalidInput` carrying
/// the API's message; the rest map by status.
async fn check_response(response: reqwest::Response, model: &str) -> Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 => Err(HuginnError::AuthenticationFailed),
        404 => Err(HuginnError::ModelNotFound(model.to_string())),
        429 => {
            // Try to parse retry-after header
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(HuginnError::RateLimited { retry_after })
        }
        503 => Err(HuginnError::Api {
            status: 503,
            message: "Model is loading, please retry".to_string(),
        }),
        400 | 422 => {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("HuggingFace API error: {status}"));
            Err(HuginnError::InvalidInput(message))
        }
        code => Err(HuginnError::Api {
            status: code,
            message: format!("HuggingFace API error: {}", status),
        }),
    }
}

#[derive(Serialize)]
struct TextClassificationRequest<'a> {
    inputs: &'a str,
}

/// Single input yields `[[{label, score}, ...]]` on the current API and
/// `[{label, score}, ...]` on older deployments.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextClassificationResponse {
    Nested(Vec<Vec<TextClassification>>),
    Flat(Vec<TextClassification>),
}

impl TextClassificationResponse {
    fn into_candidates(self) -> Vec<TextClassification> {
        match self {
            Self::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            Self::Flat(candidates) => candidates,
        }
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
    multi_label: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    hypothesis_template: Option<&'a str>,
}

/// `{sequence, labels, scores}` from the pipeline API, or a list of
/// `{label, score}` from the router API.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Parallel { labels: Vec<String>, scores: Vec<f32> },
    Pairs(Vec<TextClassification>),
}

impl ZeroShotResponse {
    fn into_scores(self) -> ZeroShotScores {
        match self {
            Self::Parallel { labels, scores } => ZeroShotScores { labels, scores },
            Self::Pairs(pairs) => {
                ZeroShotScores::from_pairs(pairs.into_iter().map(|p| (p.label, p.score)))
            }
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

// ============================================================================
// Provider Trait Implementations
// ============================================================================

#[async_trait]
impl SentimentProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify_text(&self, text: &str, model: &str) -> Result<TextClassification> {
        HuggingFaceClient::classify_text(self, text, model).await
    }
}

#[async_trait]
impl ClassifyProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        options: &ZeroShotOptions,
        model: &str,
    ) -> Result<ZeroShotScores> {
        HuggingFaceClient::classify(self, text, labels, options, model).await
    }
}

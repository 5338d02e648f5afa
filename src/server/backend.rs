//! Build the shared [`Analyzer`] from configuration.

use std::sync::Arc;

use super::config::{Config, Secrets};
use crate::providers::{ClassifyProvider, SentimentProvider};
use crate::{Analyzer, HuginnError, Result, SentimentClassifier, TopicClassifier};

/// Providers for the two classification steps.
pub struct Backend {
    pub sentiment: Arc<dyn SentimentProvider>,
    pub topics: Arc<dyn ClassifyProvider>,
}

impl Backend {
    /// Pick a backend: local ONNX models when `[providers.local]` is present
    /// and the crate was built with `local-inference`, otherwise the
    /// HuggingFace API when a key is available.
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        if config.providers.local.is_some() {
            #[cfg(feature = "local-inference")]
            return local_backend(config);

            #[cfg(not(feature = "local-inference"))]
            tracing::warn!("[providers.local] ignored: built without the `local-inference` feature");
        }

        #[cfg(feature = "huggingface")]
        if let Some(key) = secrets.api_key("huggingface") {
            return huggingface_backend(config, key);
        }

        #[cfg(not(feature = "huggingface"))]
        let _ = secrets;

        Err(HuginnError::NoProvider)
    }
}

/// Build the analyzer once; the result is shared across all requests.
pub fn build_analyzer(config: &Config, secrets: &Secrets) -> Result<Analyzer> {
    let backend = Backend::from_config(config, secrets)?;
    Ok(analyzer_with(config, backend))
}

/// Wire `backend` into an analyzer using the model and threshold settings.
pub fn analyzer_with(config: &Config, backend: Backend) -> Analyzer {
    let sentiment = SentimentClassifier::new(backend.sentiment, &config.models.sentiment);
    let topics = TopicClassifier::new(backend.topics, &config.models.topic)
        .with_threshold(config.analysis.threshold)
        .with_hypothesis_template(&config.analysis.hypothesis_template);
    Analyzer::new(sentiment, topics)
}

#[cfg(feature = "huggingface")]
fn huggingface_backend(config: &Config, api_key: String) -> Result<Backend> {
    use crate::providers::HuggingFaceClient;

    let hf = config.providers.huggingface.clone().unwrap_or_default();
    let client = Arc::new(HuggingFaceClient::with_options(
        api_key,
        &hf.base_url,
        std::time::Duration::from_secs(hf.timeout_secs),
    )?);
    tracing::info!(base_url = %hf.base_url, "using HuggingFace inference backend");

    Ok(Backend {
        sentiment: client.clone(),
        topics: client,
    })
}

#[cfg(feature = "local-inference")]
fn local_backend(config: &Config) -> Result<Backend> {
    use crate::model::{Device, ModelSource, default_cache_dir};
    use crate::providers::{
        LocalSentimentProvider, LocalZeroShotProvider, OnnxSentimentModel, OnnxZeroShotModel,
    };

    let local = config
        .providers
        .local
        .as_ref()
        .ok_or(HuginnError::NoProvider)?;
    let device: Device = local.device.parse()?;
    let cache_dir = local.models_dir.clone().unwrap_or_else(default_cache_dir);

    let source = |model: &str| {
        let path = std::path::Path::new(model);
        if path.is_dir() {
            ModelSource::local(path)
        } else {
            ModelSource::huggingface(model)
        }
    };

    tracing::info!(%device, cache_dir = %cache_dir.display(), "loading local models");
    let sentiment_source = source(config.models.sentiment.as_str());
    let topic_source = source(config.models.topic.as_str());
    let sentiment = OnnxSentimentModel::new(&sentiment_source, &cache_dir, device)?;
    let topics = OnnxZeroShotModel::new(&topic_source, &cache_dir, device)?;
    tracing::info!(
        sentiment = sentiment.name(),
        topic = topics.name(),
        "local models loaded"
    );

    Ok(Backend {
        sentiment: Arc::new(LocalSentimentProvider::new(sentiment)),
        topics: Arc::new(LocalZeroShotProvider::new(topics)),
    })
}

//! Sentiment classifier adapter.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::providers::SentimentProvider;
use crate::types::SentimentLabel;
use crate::{Result, telemetry};

/// Default sentiment model.
pub const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";

/// Labels a comment's sentiment through a [`SentimentProvider`].
#[derive(Clone)]
pub struct SentimentClassifier {
    provider: Arc<dyn SentimentProvider>,
    model: String,
}

impl SentimentClassifier {
    pub fn new(provider: Arc<dyn SentimentProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Best sentiment label for `text`. Provider errors propagate unchanged.
    #[instrument(skip(self, text), fields(operation = "sentiment", provider = self.provider.name()))]
    pub async fn classify_sentiment(&self, text: &str) -> Result<SentimentLabel> {
        let start = Instant::now();
        let result = self.provider.classify_text(text, &self.model).await;
        telemetry::record_classifier_call(
            self.provider.name(),
            "sentiment",
            result.is_ok(),
            start.elapsed(),
        );

        let classification = result?;
        debug!(label = %classification.label, score = classification.score, "sentiment classified");
        Ok(SentimentLabel::from(classification.label))
    }
}

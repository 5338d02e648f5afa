//! Topic classifier adapter.
//!
//! Runs multi-label zero-shot classification over the fixed [`Topic`]
//! vocabulary and keeps the topics whose score is strictly above the
//! confidence threshold.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::providers::ClassifyProvider;
use crate::types::{Topic, ZeroShotOptions, ZeroShotScores};
use crate::{HuginnError, Result, telemetry};

/// Default zero-shot model.
pub const DEFAULT_TOPIC_MODEL: &str = "MoritzLaurer/deberta-v3-large-zeroshot-v2.0";

/// Minimum confidence (exclusive) for a topic to count as matched.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Hypothesis framing the comment as product feedback about one aspect.
pub const TOPIC_HYPOTHESIS_TEMPLATE: &str = "The following text is a user comment from a product feedback system, primarily concerning the {} aspect of the product.";

/// Tags a comment with the topics it is about through a [`ClassifyProvider`].
#[derive(Clone)]
pub struct TopicClassifier {
    provider: Arc<dyn ClassifyProvider>,
    model: String,
    threshold: f32,
    hypothesis_template: String,
}

impl TopicClassifier {
    pub fn new(provider: Arc<dyn ClassifyProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            threshold: DEFAULT_THRESHOLD,
            hypothesis_template: TOPIC_HYPOTHESIS_TEMPLATE.to_string(),
        }
    }

    /// Override the confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the hypothesis template (must contain `{}`).
    pub fn with_hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = template.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Topics matched by `text`, in provider order.
    #[instrument(skip(self, text), fields(operation = "topic", provider = self.provider.name()))]
    pub async fn classify_topics(&self, text: &str) -> Result<Vec<Topic>> {
        let options = ZeroShotOptions::default()
            .multi_label(true)
            .hypothesis_template(self.hypothesis_template.as_str());

        let start = Instant::now();
        let result = self
            .provider
            .classify_zero_shot(text, &Topic::labels(), &options, &self.model)
            .await;
        telemetry::record_classifier_call(
            self.provider.name(),
            "topic",
            result.is_ok(),
            start.elapsed(),
        );

        let scores = result?;
        if scores.labels.len() != scores.scores.len() {
            return Err(HuginnError::DataError(format!(
                "classifier returned {} labels but {} scores",
                scores.labels.len(),
                scores.scores.len()
            )));
        }

        let topics = filter_topics(&scores, self.threshold);
        debug!(?topics, candidates = scores.len(), "topics classified");
        for topic in &topics {
            metrics::counter!(telemetry::TOPIC_MATCHES_TOTAL, "topic" => topic.as_str()).increment(1);
        }
        Ok(topics)
    }
}

/// Keep topics scored strictly above `threshold`, preserving order.
///
/// Labels outside the topic vocabulary are skipped.
pub fn filter_topics(scores: &ZeroShotScores, threshold: f32) -> Vec<Topic> {
    scores
        .iter()
        .filter(|(_, score)| *score > threshold)
        .filter_map(|(label, _)| {
            let topic = Topic::from_label(label);
            if topic.is_none() {
                warn!(label, "classifier returned a label outside the topic vocabulary");
            }
            topic
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns fixed scores and records the request.
    struct RecordingProvider {
        scores: ZeroShotScores,
        seen: Mutex<Option<(Vec<String>, ZeroShotOptions)>>,
    }

    #[async_trait]
    impl ClassifyProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn classify_zero_shot(
            &self,
            _text: &str,
            labels: &[&str],
            options: &ZeroShotOptions,
            _model: &str,
        ) -> Result<ZeroShotScores> {
            *self.seen.lock().unwrap() = Some((
                labels.iter().map(|l| l.to_string()).collect(),
                options.clone(),
            ));
            Ok(self.scores.clone())
        }
    }

    fn recording(pairs: &[(&str, f32)]) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            scores: ZeroShotScores::from_pairs(pairs.iter().copied()),
            seen: Mutex::new(None),
        })
    }

    #[test]
    fn threshold_is_strict() {
        let scores = ZeroShotScores::from_pairs([
            ("Error Handling", 0.95),
            ("Quality", 0.7),
            ("Performance", 0.3),
        ]);
        assert_eq!(filter_topics(&scores, 0.7), vec![Topic::ErrorHandling]);
    }

    #[test]
    fn multiple_topics_keep_provider_order() {
        let scores = ZeroShotScores::from_pairs([
            ("Usability", 0.92),
            ("Performance", 0.81),
            ("Quality", 0.71),
        ]);
        assert_eq!(
            filter_topics(&scores, 0.7),
            vec![Topic::Usability, Topic::Performance, Topic::Quality]
        );
    }

    #[test]
    fn no_topic_above_threshold() {
        let scores = ZeroShotScores::from_pairs([("Usability", 0.2), ("Performance", 0.1)]);
        assert!(filter_topics(&scores, 0.7).is_empty());
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let scores = ZeroShotScores::from_pairs([("Billing", 0.99), ("Quality", 0.8)]);
        assert_eq!(filter_topics(&scores, 0.7), vec![Topic::Quality]);
    }

    #[tokio::test]
    async fn sends_vocabulary_multi_label_and_template() {
        let provider = recording(&[("Performance", 0.9)]);
        let classifier = TopicClassifier::new(provider.clone(), "zs-model");

        let topics = classifier.classify_topics("so slow").await.unwrap();
        assert_eq!(topics, vec![Topic::Performance]);

        let (labels, options) = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(labels, Topic::labels().map(String::from).to_vec());
        assert!(options.multi_label);
        assert_eq!(
            options.hypothesis_template.as_deref(),
            Some(TOPIC_HYPOTHESIS_TEMPLATE)
        );
    }

    #[tokio::test]
    async fn custom_threshold_applies() {
        let provider = recording(&[("Performance", 0.6), ("Quality", 0.4)]);
        let classifier = TopicClassifier::new(provider, "zs-model").with_threshold(0.5);

        let topics = classifier.classify_topics("so slow").await.unwrap();
        assert_eq!(topics, vec![Topic::Performance]);
    }

    #[tokio::test]
    async fn mismatched_scores_are_data_error() {
        let provider = Arc::new(RecordingProvider {
            scores: ZeroShotScores {
                labels: vec!["Quality".into(), "Usability".into()],
                scores: vec![0.9],
            },
            seen: Mutex::new(None),
        });
        let classifier = TopicClassifier::new(provider, "zs-model");

        let err = classifier.classify_topics("meh").await.unwrap_err();
        assert!(matches!(err, HuginnError::DataError(_)));
    }
}

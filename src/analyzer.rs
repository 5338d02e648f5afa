//! Comment analysis: validity gate, sentiment, then topics.

use std::time::Instant;

use tracing::{error, instrument};

use crate::classifier::{SentimentClassifier, TopicClassifier};
use crate::types::{Analysis, AnalysisError, AnalysisErrorKind};
use crate::{HuginnError, telemetry, validity};

/// Runs the full analysis for one comment.
///
/// Built once at startup and shared across requests; holds no mutable
/// state.
#[derive(Clone)]
pub struct Analyzer {
    sentiment: SentimentClassifier,
    topics: TopicClassifier,
}

impl Analyzer {
    pub fn new(sentiment: SentimentClassifier, topics: TopicClassifier) -> Self {
        Self { sentiment, topics }
    }

    pub fn sentiment(&self) -> &SentimentClassifier {
        &self.sentiment
    }

    pub fn topics(&self) -> &TopicClassifier {
        &self.topics
    }

    /// Analyze `text`.
    ///
    /// Never fails with a library error: invalid input and classifier
    /// failures both come back as an [`AnalysisError`] whose message is safe
    /// to show a client. Full error detail goes to the log.
    #[instrument(skip_all)]
    pub async fn analyze(&self, text: &str) -> Result<Analysis, AnalysisError> {
        let start = Instant::now();
        let result = self.run(text).await;

        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind.as_str(),
        };
        metrics::counter!(telemetry::ANALYSES_TOTAL, "status" => status).increment(1);
        metrics::histogram!(telemetry::ANALYSIS_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, text: &str) -> Result<Analysis, AnalysisError> {
        if !validity::is_valid(text) {
            let err = AnalysisError::invalid_input();
            error!(comment = text, "{}", err.message);
            return Err(err);
        }

        self.classify(text).await.map_err(|e| {
            let err = AnalysisError::from(&e);
            log_classifier_error(&e, err.kind);
            err
        })
    }

    async fn classify(&self, text: &str) -> crate::Result<Analysis> {
        let sentiment = self.sentiment.classify_sentiment(text).await?;
        let topic = self.topics.classify_topics(text).await?;
        Ok(Analysis { sentiment, topic })
    }
}

fn log_classifier_error(err: &HuginnError, kind: AnalysisErrorKind) {
    match kind {
        AnalysisErrorKind::Value => {
            error!(error = %err, error_debug = ?err, kind = kind.as_str(), "value error encountered")
        }
        AnalysisErrorKind::Processing => {
            error!(error = %err, error_debug = ?err, kind = kind.as_str(), "error during model processing")
        }
        AnalysisErrorKind::InvalidInput | AnalysisErrorKind::Unexpected => {
            error!(error = %err, error_debug = ?err, kind = kind.as_str(), "unexpected error processing text")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::providers::{ClassifyProvider, SentimentProvider};
    use crate::types::{
        PROCESSING_ERROR_MESSAGE, TextClassification, Topic, UNEXPECTED_ERROR_MESSAGE,
        ZeroShotOptions, ZeroShotScores,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls(AtomicUsize);

    struct MockSentiment {
        label: &'static str,
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl SentimentProvider for MockSentiment {
        fn name(&self) -> &str {
            "mock"
        }

        async fn classify_text(&self, _text: &str, _model: &str) -> Result<TextClassification> {
            self.calls.0.fetch_add(1, Ordering::SeqCst);
            Ok(TextClassification {
                label: self.label.to_string(),
                score: 0.9,
            })
        }
    }

    enum TopicBehaviour {
        Scores(Vec<(&'static str, f32)>),
        ValueError,
        ApiError,
        ConfigError,
    }

    struct MockTopics(TopicBehaviour);

    #[async_trait]
    impl ClassifyProvider for MockTopics {
        fn name(&self) -> &str {
            "mock"
        }

        async fn classify_zero_shot(
            &self,
            _text: &str,
            _labels: &[&str],
            _options: &ZeroShotOptions,
            _model: &str,
        ) -> Result<ZeroShotScores> {
            match &self.0 {
                TopicBehaviour::Scores(pairs) => Ok(ZeroShotScores::from_pairs(pairs.clone())),
                TopicBehaviour::ValueError => {
                    Err(HuginnError::InvalidInput("sequence too long".into()))
                }
                TopicBehaviour::ApiError => Err(HuginnError::Api {
                    status: 500,
                    message: "internal".into(),
                }),
                TopicBehaviour::ConfigError => Err(HuginnError::Configuration("boom".into())),
            }
        }
    }

    fn analyzer(behaviour: TopicBehaviour) -> (Analyzer, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let sentiment = SentimentClassifier::new(
            Arc::new(MockSentiment {
                label: "negative",
                calls: calls.clone(),
            }),
            "sentiment-model",
        );
        let topics = TopicClassifier::new(Arc::new(MockTopics(behaviour)), "topic-model");
        (Analyzer::new(sentiment, topics), calls)
    }

    #[tokio::test]
    async fn merges_sentiment_and_thresholded_topics() {
        let (analyzer, _) = analyzer(TopicBehaviour::Scores(vec![
            ("Error Handling", 0.95),
            ("Performance", 0.3),
        ]));

        let analysis = analyzer
            .analyze("The app crashes every time I upload a photo")
            .await
            .unwrap();
        assert_eq!(analysis.sentiment.as_str(), "negative");
        assert_eq!(analysis.topic, vec![Topic::ErrorHandling]);
    }

    #[tokio::test]
    async fn score_equal_to_threshold_is_excluded() {
        let (analyzer, _) = analyzer(TopicBehaviour::Scores(vec![("Quality", 0.7)]));

        let analysis = analyzer.analyze("Quality is fine").await.unwrap();
        assert!(analysis.topic.is_empty());
    }

    #[tokio::test]
    async fn invalid_input_skips_classifiers() {
        let (analyzer, calls) = analyzer(TopicBehaviour::Scores(vec![]));

        let err = analyzer.analyze("111").await.unwrap_err();
        assert_eq!(err.kind, AnalysisErrorKind::InvalidInput);
        assert_eq!(err.message, "Invalid input text");
        assert_eq!(calls.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn value_error_keeps_message() {
        let (analyzer, _) = analyzer(TopicBehaviour::ValueError);

        let err = analyzer.analyze("a perfectly fine comment").await.unwrap_err();
        assert_eq!(err.kind, AnalysisErrorKind::Value);
        assert!(err.message.contains("sequence too long"));
    }

    #[tokio::test]
    async fn processing_error_is_generic() {
        let (analyzer, _) = analyzer(TopicBehaviour::ApiError);

        let err = analyzer.analyze("a perfectly fine comment").await.unwrap_err();
        assert_eq!(err.kind, AnalysisErrorKind::Processing);
        assert_eq!(err.message, PROCESSING_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn other_errors_are_unexpected() {
        let (analyzer, _) = analyzer(TopicBehaviour::ConfigError);

        let err = analyzer.analyze("a perfectly fine comment").await.unwrap_err();
        assert_eq!(err.kind, AnalysisErrorKind::Unexpected);
        assert_eq!(err.message, UNEXPECTED_ERROR_MESSAGE);
    }
}

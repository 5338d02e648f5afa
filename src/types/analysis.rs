//! Analysis outcome types.

use serde::{Deserialize, Serialize};

use super::{SentimentLabel, Topic};
use crate::HuginnError;

/// Message returned when a comment fails the validity check.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input text";
/// Message returned for model/runtime failures.
pub const PROCESSING_ERROR_MESSAGE: &str = "Model processing error";
/// Message returned for anything not otherwise bucketed.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// A successfully analyzed comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sentiment: SentimentLabel,
    /// Topics scored above the confidence threshold, in classifier order.
    pub topic: Vec<Topic>,
}

/// Why an analysis did not produce a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// The comment failed the validity check.
    InvalidInput,
    /// A classifier rejected its input.
    Value,
    /// A classifier backend failed or returned malformed data.
    Processing,
    /// Anything else.
    Unexpected,
}

impl AnalysisErrorKind {
    /// Bucket a classifier error.
    pub fn of(err: &HuginnError) -> Self {
        match err {
            HuginnError::InvalidInput(_) => Self::Value,
            HuginnError::Http(_)
            | HuginnError::Api { .. }
            | HuginnError::RateLimited { .. }
            | HuginnError::AuthenticationFailed
            | HuginnError::ModelNotFound(_)
            | HuginnError::Inference(_)
            | HuginnError::EmptyResponse
            | HuginnError::Json(_)
            | HuginnError::DataError(_) => Self::Processing,
            HuginnError::NoProvider | HuginnError::Configuration(_) | HuginnError::Io(_) => {
                Self::Unexpected
            }
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Value => "value",
            Self::Processing => "processing",
            Self::Unexpected => "unexpected",
        }
    }
}

/// Failed analysis. Serializes as `{"error": message}`; the kind stays
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct AnalysisError {
    #[serde(skip)]
    pub kind: AnalysisErrorKind,
    #[serde(rename = "error")]
    pub message: String,
}

impl AnalysisError {
    pub fn new(kind: AnalysisErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input() -> Self {
        Self::new(AnalysisErrorKind::InvalidInput, INVALID_INPUT_MESSAGE)
    }
}

impl From<&HuginnError> for AnalysisError {
    /// Value errors keep the classifier's own message; the other buckets get
    /// a fixed message so backend details stay out of responses.
    fn from(err: &HuginnError) -> Self {
        let kind = AnalysisErrorKind::of(err);
        let message = match (kind, err) {
            (AnalysisErrorKind::Value, HuginnError::InvalidInput(message)) => message.clone(),
            (AnalysisErrorKind::Value, _) => err.to_string(),
            (AnalysisErrorKind::Processing, _) => PROCESSING_ERROR_MESSAGE.to_string(),
            (AnalysisErrorKind::InvalidInput, _) => INVALID_INPUT_MESSAGE.to_string(),
            (AnalysisErrorKind::Unexpected, _) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        };
        Self { kind, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_serializes_flat() {
        let analysis = Analysis {
            sentiment: SentimentLabel::new("negative"),
            topic: vec![Topic::ErrorHandling],
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sentiment": "negative", "topic": ["Error Handling"]})
        );
    }

    #[test]
    fn error_serializes_message_only() {
        let json = serde_json::to_value(AnalysisError::invalid_input()).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Invalid input text"}));
    }

    #[test]
    fn value_errors_keep_their_message() {
        let err = AnalysisError::from(&HuginnError::InvalidInput("text too long".into()));
        assert_eq!(err.kind, AnalysisErrorKind::Value);
        assert_eq!(err.message, "text too long");
    }

    #[test]
    fn malformed_backend_data_is_a_processing_error() {
        let err = AnalysisError::from(&HuginnError::DataError(
            "zero-shot response has 2 labels but 1 scores".into(),
        ));
        assert_eq!(err.kind, AnalysisErrorKind::Processing);
        assert_eq!(err.message, PROCESSING_ERROR_MESSAGE);
    }

    #[test]
    fn processing_errors_hide_details() {
        let err = AnalysisError::from(&HuginnError::Api {
            status: 500,
            message: "stack trace here".into(),
        });
        assert_eq!(err.kind, AnalysisErrorKind::Processing);
        assert_eq!(err.message, PROCESSING_ERROR_MESSAGE);
    }

    #[test]
    fn other_errors_are_unexpected() {
        let err = AnalysisError::from(&HuginnError::NoProvider);
        assert_eq!(err.kind, AnalysisErrorKind::Unexpected);
        assert_eq!(err.message, UNEXPECTED_ERROR_MESSAGE);
    }
}

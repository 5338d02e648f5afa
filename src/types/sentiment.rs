//! Sentiment label type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentiment label produced by the sentiment model.
///
/// The label set belongs to the model (e.g. `positive`, `neutral`,
/// `negative`); it is forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentLabel(String);

impl SentimentLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SentimentLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl From<&str> for SentimentLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

//! Topic vocabulary for feedback comments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::HuginnError;

/// A product aspect a comment can be about.
///
/// The vocabulary is fixed; these are the candidate labels sent to the
/// zero-shot classifier. Serialized as the human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Performance,
    Quality,
    Usability,
    #[serde(rename = "Error Handling")]
    ErrorHandling,
    #[serde(rename = "Personal Data")]
    PersonalData,
    #[serde(rename = "Data Accuracy")]
    DataAccuracy,
}

impl Topic {
    /// Every topic, in candidate-label order.
    pub const ALL: [Topic; 6] = [
        Topic::Performance,
        Topic::Quality,
        Topic::Usability,
        Topic::ErrorHandling,
        Topic::PersonalData,
        Topic::DataAccuracy,
    ];

    /// The label as the classifier sees it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Quality => "Quality",
            Self::Usability => "Usability",
            Self::ErrorHandling => "Error Handling",
            Self::PersonalData => "Personal Data",
            Self::DataAccuracy => "Data Accuracy",
        }
    }

    /// Candidate labels for a zero-shot request.
    pub fn labels() -> [&'static str; 6] {
        Self::ALL.map(|t| t.as_str())
    }

    /// Look up a topic by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = HuginnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| HuginnError::InvalidInput(format!("unknown topic: {s}")))
    }
}

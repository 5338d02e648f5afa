//! Raw classifier outputs, as returned by providers.

use serde::{Deserialize, Serialize};

/// Single-label text classification (e.g. sentiment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextClassification {
    /// The winning label.
    pub label: String,
    /// Model confidence for `label` (0.0 to 1.0).
    pub score: f32,
}

impl TextClassification {
    /// Pick the highest-scoring entry; `None` when `candidates` is empty.
    pub fn best(candidates: impl IntoIterator<Item = TextClassification>) -> Option<Self> {
        candidates
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }
}

/// Zero-shot classification scores.
///
/// `labels` and `scores` are parallel, in provider order (HuggingFace
/// returns them sorted by descending score).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotScores {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl ZeroShotScores {
    /// Build from `(label, score)` pairs, keeping their order.
    pub fn from_pairs<L: Into<String>>(pairs: impl IntoIterator<Item = (L, f32)>) -> Self {
        let (labels, scores) = pairs.into_iter().map(|(l, s)| (l.into(), s)).unzip();
        Self { labels, scores }
    }

    /// Iterate `(label, score)` pairs in provider order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Score for a label, if the provider returned one.
    pub fn score(&self, label: &str) -> Option<f32> {
        self.iter().find(|(l, _)| *l == label).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Options for a zero-shot request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZeroShotOptions {
    /// Hypothesis with a single `{}` placeholder for the candidate label.
    pub hypothesis_template: Option<String>,
    /// Score each label independently instead of normalizing across labels.
    pub multi_label: bool,
}

impl ZeroShotOptions {
    pub fn multi_label(mut self, multi_label: bool) -> Self {
        self.multi_label = multi_label;
        self
    }

    pub fn hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = Some(template.into());
        self
    }

    /// Render the hypothesis for one label (`"This example is {}."` when unset).
    pub fn hypothesis_for(&self, label: &str) -> String {
        self.hypothesis_template
            .as_deref()
            .unwrap_or(DEFAULT_HYPOTHESIS_TEMPLATE)
            .replacen("{}", label, 1)
    }
}

/// HuggingFace's default zero-shot hypothesis.
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

//! Provider traits for the two classification capabilities.
//!
//! The analysis layer only sees these traits; a backend (HuggingFace
//! Inference API, local ONNX models, a test mock) implements one or both.
//! Providers are constructed once at startup and shared behind `Arc`, so
//! implementations must be `Send + Sync` and take `&self`.

use async_trait::async_trait;

use crate::Result;
use crate::types::{TextClassification, ZeroShotOptions, ZeroShotScores};

// ============================================================================
// Sentiment Provider
// ============================================================================

/// Provider for single-label text classification (sentiment).
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Classify `text` and return the best label with its score.
    async fn classify_text(&self, text: &str, model: &str) -> Result<TextClassification>;
}

// ============================================================================
// Classification Provider
// ============================================================================

/// Provider for zero-shot text classification.
#[async_trait]
pub trait ClassifyProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Score `text` against each candidate label.
    ///
    /// Returns one score per label. With `options.multi_label` each score
    /// is independent; otherwise they are normalized across labels.
    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        options: &ZeroShotOptions,
        model: &str,
    ) -> Result<ZeroShotScores>;
}

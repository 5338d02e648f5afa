//! Public types for the Huginn API.

mod analysis;
mod inference;
mod sentiment;
mod topic;

pub use analysis::{
    Analysis, AnalysisError, AnalysisErrorKind, INVALID_INPUT_MESSAGE, PROCESSING_ERROR_MESSAGE,
    UNEXPECTED_ERROR_MESSAGE,
};
pub use inference::{
    DEFAULT_HYPOTHESIS_TEMPLATE, TextClassification, ZeroShotOptions, ZeroShotScores,
};
pub use sentiment::SentimentLabel;
pub use topic::Topic;

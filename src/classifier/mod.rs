//! Classifier adapters.
//!
//! Thin wrappers that bind a provider to a model and shape its raw output
//! into domain types: a [`SentimentLabel`](crate::SentimentLabel) for
//! sentiment, a thresholded list of [`Topic`](crate::Topic)s for topics.

pub mod sentiment;
pub mod topic;

pub use sentiment::{DEFAULT_SENTIMENT_MODEL, SentimentClassifier};
pub use topic::{
    DEFAULT_THRESHOLD, DEFAULT_TOPIC_MODEL, TOPIC_HYPOTHESIS_TEMPLATE, TopicClassifier,
    filter_topics,
};

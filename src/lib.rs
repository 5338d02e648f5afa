//! Huginn - feedback comment analysis
//!
//! Takes a free-text comment, rejects obviously meaningless input, and
//! classifies the rest for sentiment and for topics from a fixed taxonomy.
//! Classification runs against a pluggable backend: the HuggingFace
//! Inference API by default, or local ONNX models with the
//! `local-inference` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use huginn::providers::HuggingFaceClient;
//! use huginn::{Analyzer, SentimentClassifier, TopicClassifier};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let client = Arc::new(HuggingFaceClient::new("hf_your_key")?);
//!     let analyzer = Analyzer::new(
//!         SentimentClassifier::new(client.clone(), huginn::classifier::DEFAULT_SENTIMENT_MODEL),
//!         TopicClassifier::new(client, huginn::classifier::DEFAULT_TOPIC_MODEL),
//!     );
//!
//!     match analyzer.analyze("The app crashes every time I upload a photo").await {
//!         Ok(analysis) => println!("{} {:?}", analysis.sentiment, analysis.topic),
//!         Err(e) => eprintln!("rejected: {e}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod classifier;
pub mod error;
#[cfg(feature = "local-inference")]
pub mod model;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod validity;
pub mod version;

// Re-export main types at crate root
pub use analyzer::Analyzer;
pub use classifier::{SentimentClassifier, TopicClassifier};
pub use error::{HuginnError, Result};
pub use validity::is_valid;
pub use version::{PKG_VERSION, version_string};

#[cfg(feature = "local-inference")]
pub use model::{Device, ModelSource};

pub use types::{
    Analysis, AnalysisError, AnalysisErrorKind, SentimentLabel, TextClassification, Topic,
    ZeroShotOptions, ZeroShotScores,
};

//! Classification backends.
//!
//! Each backend implements [`SentimentProvider`] and/or [`ClassifyProvider`];
//! the analysis layer depends only on the traits.

pub mod traits;

#[cfg(feature = "huggingface")]
pub mod huggingface;
#[cfg(feature = "local-inference")]
pub mod onnx;

pub use traits::{ClassifyProvider, SentimentProvider};

#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceClient;
#[cfg(feature = "local-inference")]
pub use onnx::{LocalSentimentProvider, LocalZeroShotProvider, OnnxSentimentModel, OnnxZeroShotModel};

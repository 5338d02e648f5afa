//! Model source and download logic.

use std::path::{Path, PathBuf};

use crate::error::{HuginnError, Result};

/// Where a local model's files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// HuggingFace Hub repository with an exported `onnx/model.onnx`.
    HuggingFace {
        /// Repository ID (e.g., "MoritzLaurer/deberta-v3-large-zeroshot-v2.0").
        repo_id: String,
    },

    /// Directory holding `model.onnx` (or `onnx/model.onnx`),
    /// `tokenizer.json`, and `config.json`.
    Local {
        /// Path to the model directory.
        path: PathBuf,
    },
}

/// Resolved on-disk paths for a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub config: PathBuf,
}

impl ModelSource {
    /// Create a HuggingFace source.
    pub fn huggingface(repo_id: impl Into<String>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
        }
    }

    /// Create a local source.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    /// Model name for display.
    pub fn name(&self) -> String {
        match self {
            Self::HuggingFace { repo_id } => repo_id.clone(),
            Self::Local { path } => path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("local")
                .to_string(),
        }
    }

    /// Download or resolve the model files.
    ///
    /// HuggingFace sources are downloaded into `cache_dir` on first use.
    pub fn resolve(&self, cache_dir: &Path) -> Result<ModelFiles> {
        match self {
            Self::HuggingFace { repo_id } => {
                let api = hf_hub::api::sync::ApiBuilder::new()
                    .with_cache_dir(cache_dir.to_path_buf())
                    .build()
                    .map_err(|e| {
                        HuginnError::Configuration(format!("Failed to initialize HF API: {}", e))
                    })?;

                let repo = api.model(repo_id.clone());
                let fetch = |file: &str| {
                    repo.get(file).map_err(|e| {
                        HuginnError::Configuration(format!(
                            "Failed to download {} from {}: {}",
                            file, repo_id, e
                        ))
                    })
                };

                Ok(ModelFiles {
                    model: fetch("onnx/model.onnx")?,
                    tokenizer: fetch("tokenizer.json")?,
                    config: fetch("config.json")?,
                })
            }
            Self::Local { path } => Self::local_files(path),
        }
    }

    fn local_files(dir: &Path) -> Result<ModelFiles> {
        let model = [dir.join("model.onnx"), dir.join("onnx").join("model.onnx")]
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| {
                HuginnError::Configuration(format!("No model.onnx under {}", dir.display()))
            })?;

        let require = |name: &str| {
            let path = dir.join(name);
            if path.exists() {
                Ok(path)
            } else {
                Err(HuginnError::Configuration(format!(
                    "Local model path does not exist: {}",
                    path.display()
                )))
            }
        };

        Ok(ModelFiles {
            model,
            tokenizer: require("tokenizer.json")?,
            config: require("config.json")?,
        })
    }
}

/// Default cache directory for downloaded models.
///
/// `HUGINN_CACHE_DIR` wins; otherwise the platform cache dir.
pub fn default_cache_dir() -> PathBuf {
    std::env::var("HUGINN_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("huginn")
                .join("models")
        })
}

//! Local sentiment and zero-shot classification via ONNX Runtime.
//!
//! Both models are sequence classifiers exported to ONNX:
//! - sentiment runs one forward pass and takes the arg-max label;
//! - zero-shot runs an NLI model once per candidate label, pairing the text
//!   (premise) with the rendered hypothesis, and reads the entailment logit.
//!
//! Sessions need `&mut` to run, so the async providers keep each model behind
//! a mutex and run inference on the blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::traits::{ClassifyProvider, SentimentProvider};
use crate::error::{HuginnError, Result};
use crate::model::{Device, ModelFiles, ModelSource};
use crate::types::{TextClassification, ZeroShotOptions, ZeroShotScores};

/// Label names from a model's `config.json`, indexed by logit position.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLabels(Vec<String>);

#[derive(Deserialize)]
struct ModelConfig {
    id2label: std::collections::HashMap<String, String>,
}

impl ModelLabels {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Parse `id2label` from a HuggingFace `config.json`.
    pub fn from_config_json(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        let mut pairs = config
            .id2label
            .into_iter()
            .map(|(id, label)| {
                id.parse::<usize>()
                    .map(|id| (id, label))
                    .map_err(|_| HuginnError::DataError(format!("non-numeric label id: {id}")))
            })
            .collect::<Result<Vec<_>>>()?;
        pairs.sort_by_key(|(id, _)| *id);

        if pairs.iter().enumerate().any(|(i, (id, _))| i != *id) {
            return Err(HuginnError::DataError(
                "id2label ids are not contiguous from 0".to_string(),
            ));
        }
        Ok(Self(pairs.into_iter().map(|(_, label)| label).collect()))
    }

    fn load(path: &Path) -> Result<Self> {
        Self::from_config_json(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Index of the entailment logit in an NLI head.
    pub fn entailment_index(&self) -> Option<usize> {
        self.0
            .iter()
            .position(|l| l.to_ascii_lowercase().starts_with("entail"))
    }

    /// Index of the logit opposing entailment: `contradiction` for 3-way
    /// heads, `not_entailment` for 2-way heads.
    pub fn contradiction_index(&self) -> Option<usize> {
        let entailment = self.entailment_index()?;
        self.0
            .iter()
            .position(|l| {
                let l = l.to_ascii_lowercase();
                l.starts_with("contradiction") || l.starts_with("not_entail")
            })
            .or_else(|| (0..self.0.len()).find(|&i| i != entailment))
    }
}

/// Tokenizer + ONNX session for a sequence classification model.
struct SequenceClassifier {
    session: Session,
    tokenizer: tokenizers::Tokenizer,
    labels: ModelLabels,
    name: String,
    token_type_ids: bool,
}

impl SequenceClassifier {
    fn load(source: &ModelSource, cache_dir: &Path, device: Device) -> Result<Self> {
        let ModelFiles {
            model,
            tokenizer,
            config,
        } = source.resolve(cache_dir)?;

        let session = build_session(&model, &device)?;
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer).map_err(|e| {
            HuginnError::Configuration(format!("Failed to load tokenizer: {}", e))
        })?;
        let labels = ModelLabels::load(&config)?;
        let token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        info!(model = %source.name(), device = device.name(), labels = labels.len(), "loaded ONNX model");

        Ok(Self {
            session,
            tokenizer,
            labels,
            name: source.name(),
            token_type_ids,
        })
    }

    /// Logits for a single text or a text pair.
    fn logits(&mut self, first: &str, second: Option<&str>) -> Result<Vec<f32>> {
        let encoding = match second {
            Some(second) => self.tokenizer.encode((first, second), true),
            None => self.tokenizer.encode(first, true),
        }
        .map_err(|e| HuginnError::DataError(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let shape = [1_usize, input_ids.len()];

        let outputs = if self.token_type_ids {
            self.session.run(ort::inputs![
                "input_ids" => tensor("input_ids", shape, &input_ids)?,
                "attention_mask" => tensor("attention_mask", shape, &attention_mask)?,
                "token_type_ids" => tensor("token_type_ids", shape, &type_ids)?,
            ])
        } else {
            self.session.run(ort::inputs![
                "input_ids" => tensor("input_ids", shape, &input_ids)?,
                "attention_mask" => tensor("attention_mask", shape, &attention_mask)?,
            ])
        }
        .map_err(|e| HuginnError::Inference(format!("ONNX inference failed: {}", e)))?;

        let logits = outputs
            .get("logits")
            .ok_or_else(|| HuginnError::Inference("No logits output found".to_string()))?;

        let (_, data) = logits
            .try_extract_tensor::<f32>()
            .map_err(|e| HuginnError::Inference(format!("Failed to extract logits: {}", e)))?;

        if data.len() != self.labels.len() {
            return Err(HuginnError::DataError(format!(
                "Expected {} logits, got {}",
                self.labels.len(),
                data.len()
            )));
        }
        Ok(data.to_vec())
    }
}

/// Tensor view over one encoded input row.
fn tensor<'a>(
    name: &str,
    shape: [usize; 2],
    data: &'a [i64],
) -> Result<ort::value::TensorRef<'a, i64>> {
    ort::value::TensorRef::from_array_view((shape, data))
        .map_err(|e| HuginnError::Inference(format!("Failed to create {name} tensor: {e}")))
}

// ============================================================================
// Sentiment
// ============================================================================

/// Local sentiment model.
pub struct OnnxSentimentModel {
    inner: SequenceClassifier,
}

impl OnnxSentimentModel {
    /// Load (downloading if needed) a sentiment model.
    pub fn new(source: &ModelSource, cache_dir: &Path, device: Device) -> Result<Self> {
        Ok(Self {
            inner: SequenceClassifier::load(source, cache_dir, device)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Best label for `text`.
    pub fn classify(&mut self, text: &str) -> Result<TextClassification> {
        let logits = self.inner.logits(text, None)?;
        best_label(&logits, &self.inner.labels)
    }
}

/// Arg-max over softmaxed logits.
fn best_label(logits: &[f32], labels: &ModelLabels) -> Result<TextClassification> {
    let probs = softmax(logits);
    let (index, score) = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or(HuginnError::EmptyResponse)?;
    let label = labels
        .get(index)
        .ok_or_else(|| HuginnError::DataError(format!("no label for logit {index}")))?;
    Ok(TextClassification {
        label: label.to_string(),
        score,
    })
}

// ============================================================================
// Zero-shot
// ============================================================================

/// Local NLI model used for zero-shot classification.
pub struct OnnxZeroShotModel {
    inner: SequenceClassifier,
    entailment: usize,
    contradiction: usize,
}

impl OnnxZeroShotModel {
    /// Load (downloading if needed) an NLI model.
    pub fn new(source: &ModelSource, cache_dir: &Path, device: Device) -> Result<Self> {
        let inner = SequenceClassifier::load(source, cache_dir, device)?;
        let (entailment, contradiction) = nli_indices(&inner.labels)?;
        Ok(Self {
            inner,
            entailment,
            contradiction,
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Score each label, sorted by descending score.
    pub fn classify(
        &mut self,
        text: &str,
        labels: &[&str],
        options: &ZeroShotOptions,
    ) -> Result<ZeroShotScores> {
        let mut entailment_logits = Vec::with_capacity(labels.len());
        for label in labels {
            let hypothesis = options.hypothesis_for(label);
            let logits = self.inner.logits(text, Some(&hypothesis))?;
            entailment_logits.push((logits[self.entailment], logits[self.contradiction]));
        }

        let scores = zero_shot_scores(&entailment_logits, options.multi_label);
        let mut pairs: Vec<(&str, f32)> = labels.iter().copied().zip(scores).collect();
        pairs.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        debug!(model = %self.inner.name, labels = labels.len(), "zero-shot scored");
        Ok(ZeroShotScores::from_pairs(pairs))
    }
}

fn nli_indices(labels: &ModelLabels) -> Result<(usize, usize)> {
    let entailment = labels.entailment_index().ok_or_else(|| {
        HuginnError::Configuration("NLI model has no entailment label".to_string())
    })?;
    let contradiction = labels.contradiction_index().ok_or_else(|| {
        HuginnError::Configuration("NLI model has no contradiction label".to_string())
    })?;
    Ok((entailment, contradiction))
}

/// Turn per-label `(entailment, contradiction)` logits into scores.
///
/// Multi-label: softmax over each label's entailment/contradiction pair.
/// Single-label: softmax of the entailment logits across labels.
fn zero_shot_scores(logits: &[(f32, f32)], multi_label: bool) -> Vec<f32> {
    if multi_label {
        logits
            .iter()
            .map(|&(entail, contra)| softmax(&[contra, entail])[1])
            .collect()
    } else {
        let entail: Vec<f32> = logits.iter().map(|&(e, _)| e).collect();
        softmax(&entail)
    }
}

/// Softmax function.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(model_path: &Path, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| {
            HuginnError::Configuration(format!("Failed to create session builder: {}", e))
        })?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| {
            HuginnError::Configuration(format!("Failed to set optimization level: {}", e))
        })?;

    // Configure execution provider based on device
    let builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| {
                    HuginnError::Configuration(format!("Failed to configure CUDA: {}", e))
                })?
        }
    };

    builder
        .commit_from_file(model_path)
        .map_err(|e| HuginnError::Configuration(format!("Failed to load ONNX model: {}", e)))
}

// ============================================================================
// Provider Trait Implementations
// ============================================================================

/// Run `f` against a shared model on the blocking pool.
async fn run_blocking<M, T, F>(model: &Arc<Mutex<M>>, f: F) -> Result<T>
where
    M: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut M) -> Result<T> + Send + 'static,
{
    let model = Arc::clone(model);
    tokio::task::spawn_blocking(move || {
        let mut guard = model
            .lock()
            .map_err(|e| HuginnError::Inference(format!("model lock poisoned: {e}")))?;
        f(&mut guard)
    })
    .await
    .map_err(|e| HuginnError::Inference(format!("inference task failed: {e}")))?
}

/// [`SentimentProvider`] over a local ONNX model.
///
/// The model is fixed at load time; the `model` argument is ignored.
#[derive(Clone)]
pub struct LocalSentimentProvider {
    model: Arc<Mutex<OnnxSentimentModel>>,
}

impl LocalSentimentProvider {
    pub fn new(model: OnnxSentimentModel) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }
}

#[async_trait]
impl SentimentProvider for LocalSentimentProvider {
    fn name(&self) -> &str {
        "onnx"
    }

    #[instrument(name = "onnx.classify_text", skip_all)]
    async fn classify_text(&self, text: &str, _model: &str) -> Result<TextClassification> {
        let text = text.to_string();
        run_blocking(&self.model, move |model| model.classify(&text)).await
    }
}

/// [`ClassifyProvider`] over a local ONNX NLI model.
///
/// The model is fixed at load time; the `model` argument is ignored.
#[derive(Clone)]
pub struct LocalZeroShotProvider {
    model: Arc<Mutex<OnnxZeroShotModel>>,
}

impl LocalZeroShotProvider {
    pub fn new(model: OnnxZeroShotModel) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }
}

#[async_trait]
impl ClassifyProvider for LocalZeroShotProvider {
    fn name(&self) -> &str {
        "onnx"
    }

    #[instrument(name = "onnx.classify_zero_shot", skip_all, fields(labels = labels.len()))]
    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        options: &ZeroShotOptions,
        _model: &str,
    ) -> Result<ZeroShotScores> {
        let text = text.to_string();
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let options = options.clone();
        run_blocking(&self.model, move |model| {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            model.classify(&text, &labels, &options)
        })
        .await
    }
}

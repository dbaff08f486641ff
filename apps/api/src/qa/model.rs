//! DistilBERT extractive QA on CPU via candle.
//!
//! Loads `config.json`, `tokenizer.json` and `model.safetensors` for a SQuAD
//! fine-tuned DistilBERT (encoder under `distilbert.*`, span head under
//! `qa_outputs.*`), either from the Hugging Face Hub or a local directory.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::errors::InferenceError;
use crate::models::resume::InferenceResult;
use crate::qa::span::SpanDecoder;
use crate::qa::QuestionAnswerer;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// The parts of config.json the span head needs; candle keeps its own fields private.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    dim: usize,
    max_position_embeddings: usize,
}

/// Paths to the three files a model is built from.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn from_dir(dir: &Path) -> Result<Self, InferenceError> {
        let files = Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.is_file() {
                return Err(InferenceError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }
        Ok(files)
    }

    /// Downloads (or reuses the local cache of) the model files from the Hub.
    pub fn from_hub(model_id: &str, revision: &str) -> Result<Self, InferenceError> {
        let api = Api::new().map_err(|e| load_error("create Hugging Face API client", e))?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));
        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| load_error(&format!("download {model_id}/{file}"), e))
        };
        Ok(Self {
            config: fetch(CONFIG_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
        })
    }
}

/// A loaded model. Read-only after construction and shared across requests.
pub struct DistilBertAnswerer {
    model: DistilBertModel,
    qa_outputs: Linear,
    tokenizer: Tokenizer,
    device: Device,
    decoder: SpanDecoder,
    cls_id: u32,
    sep_id: u32,
}

impl DistilBertAnswerer {
    /// Loads from `QA_MODEL_DIR` when set, otherwise from the Hub.
    pub fn load(config: &ModelConfig) -> Result<Self, InferenceError> {
        let files = match &config.local_dir {
            Some(dir) => {
                info!("Loading QA model from {}", dir.display());
                ModelFiles::from_dir(dir)?
            }
            None => {
                info!(
                    "Loading QA model {}@{} from the Hugging Face Hub",
                    config.model_id, config.revision
                );
                ModelFiles::from_hub(&config.model_id, &config.revision)?
            }
        };
        Self::from_files(&files, config)
    }

    pub fn from_files(files: &ModelFiles, config: &ModelConfig) -> Result<Self, InferenceError> {
        let device = Device::Cpu;

        let raw_config = std::fs::read_to_string(&files.config)
            .map_err(|e| load_error("read model config", e))?;
        let bert_config: DistilBertConfig =
            serde_json::from_str(&raw_config).map_err(|e| load_error("parse model config", e))?;
        let head: HeadConfig =
            serde_json::from_str(&raw_config).map_err(|e| load_error("parse model config", e))?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| load_error("load tokenizer", e))?;
        // Windows are built by hand; the tokenizer must not cut or pad the context.
        tokenizer
            .with_truncation(None)
            .map_err(|e| load_error("disable tokenizer truncation", e))?;
        tokenizer.with_padding(None);

        let special = |token: &str| {
            tokenizer.token_to_id(token).ok_or_else(|| {
                InferenceError::ModelLoad(format!("tokenizer has no {token} token"))
            })
        };
        let cls_id = special("[CLS]")?;
        let sep_id = special("[SEP]")?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)
                .map_err(|e| load_error("map model weights", e))?
        };
        let model = DistilBertModel::load(vb.pp("distilbert"), &bert_config)
            .map_err(|e| load_error("build DistilBERT encoder", e))?;
        let qa_outputs =
            linear(head.dim, 2, vb.pp("qa_outputs")).map_err(|e| load_error("build span head", e))?;

        let max_seq_len = if config.max_seq_len > head.max_position_embeddings {
            warn!(
                "MAX_SEQ_LEN {} exceeds the model's {} positions; clamping",
                config.max_seq_len, head.max_position_embeddings
            );
            head.max_position_embeddings
        } else {
            config.max_seq_len
        };

        info!("QA model ready (hidden size {}, window {max_seq_len} tokens)", head.dim);
        Ok(Self {
            model,
            qa_outputs,
            tokenizer,
            device,
            decoder: SpanDecoder {
                max_seq_len,
                doc_stride: config.doc_stride.min(max_seq_len.saturating_sub(1)),
                max_answer_tokens: config.max_answer_tokens,
            },
            cls_id,
            sep_id,
        })
    }

    /// Start and end logits for the context tokens of one `[CLS] q [SEP] c [SEP]` window.
    fn window_logits(
        &self,
        question_ids: &[u32],
        context_ids: &[u32],
    ) -> candle_core::Result<(Vec<f32>, Vec<f32>)> {
        let mut ids = Vec::with_capacity(question_ids.len() + context_ids.len() + 3);
        ids.push(self.cls_id);
        ids.extend_from_slice(question_ids);
        ids.push(self.sep_id);
        let context_start = ids.len();
        ids.extend_from_slice(context_ids);
        ids.push(self.sep_id);
        let seq_len = ids.len();

        let input_ids = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        // Single unpadded sequence: no position is masked.
        let mask = Tensor::zeros((seq_len, seq_len), DType::U8, &self.device)?;

        let hidden = self.model.forward(&input_ids, &mask)?;
        let logits = self.qa_outputs.forward(&hidden)?.squeeze(0)?;
        let context_logits = logits.narrow(0, context_start, context_ids.len())?;

        let start = context_logits.narrow(1, 0, 1)?.squeeze(1)?.contiguous()?.to_vec1::<f32>()?;
        let end = context_logits.narrow(1, 1, 1)?.squeeze(1)?.contiguous()?.to_vec1::<f32>()?;
        Ok((start, end))
    }
}

impl QuestionAnswerer for DistilBertAnswerer {
    fn answer(&self, question: &str, context: &str) -> Result<InferenceResult, InferenceError> {
        let question_enc = self
            .tokenizer
            .encode(question, false)
            .map_err(|e| InferenceError::Tokenization(e.to_string()))?;
        let context_enc = self
            .tokenizer
            .encode(context, false)
            .map_err(|e| InferenceError::Tokenization(e.to_string()))?;

        let question_ids = question_enc.get_ids();
        let context_ids = context_enc.get_ids();
        debug!(
            "QA over {} context tokens ({} question tokens)",
            context_ids.len(),
            question_ids.len()
        );

        let result = self.decoder.decode(
            context,
            context_enc.get_offsets(),
            question_ids.len(),
            |window| {
                self.window_logits(question_ids, &context_ids[window])
                    .map_err(|e| InferenceError::Runtime(e.to_string()))
            },
        )?;

        debug!(
            "Answer {:?} at bytes {:?} (score {:.4})",
            result.answer, result.span, result.score
        );
        Ok(result)
    }
}

fn load_error(what: &str, e: impl std::fmt::Display) -> InferenceError {
    InferenceError::ModelLoad(format!("failed to {what}: {e}"))
}

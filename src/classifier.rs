use anyhow::{Result, bail};
use async_trait::async_trait;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::debertav2::{
    Config as DebertaV2Config, DebertaV2SeqClassificationModel, Id2Label,
};
use hf_hub::{Repo, RepoType, api::tokio::Api};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::engine::Engine;
use crate::types::LABELS;

/// Candle-backed binary sequence classifier. Loaded once at startup and
/// shared read-only across requests.
pub struct ToxicityClassifier {
    model: DebertaV2SeqClassificationModel,
    tokenizer: Tokenizer,
    device: Device,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub model_id: Option<String>,
    pub model_path: Option<PathBuf>,
    pub revision: String,
    pub use_pth: bool,
    pub cpu: bool,
    pub max_sequence_length: usize,
}

impl ToxicityClassifier {
    fn device(cpu: bool) -> Result<Device> {
        if cpu {
            Ok(Device::Cpu)
        } else if metal_is_available() {
            tracing::info!("Using metal acceleration");
            Ok(Device::new_metal(0)?)
        } else if cuda_is_available() {
            tracing::info!("Using CUDA GPU acceleration");
            Ok(Device::new_cuda(0)?)
        } else {
            tracing::info!(
                "CUDA not available, running on CPU. To run on GPU, build with `--features cuda`"
            );
            Ok(Device::Cpu)
        }
    }

    #[tracing::instrument(skip(config), fields(model_id = ?config.model_id, cpu = config.cpu))]
    pub async fn new(config: ClassifierConfig) -> Result<Self> {
        let device = Self::device(config.cpu)?;

        // Get files from either the HuggingFace API, or from a specified local directory
        let (config_filename, tokenizer_filename, weights_filename) = {
            match &config.model_path {
                Some(base_path) => {
                    if !base_path.is_dir() {
                        bail!("Model path {} is not a directory.", base_path.display());
                    }

                    let config_file = base_path.join("config.json");
                    let tokenizer_file = base_path.join("tokenizer.json");
                    let weights_file = if config.use_pth {
                        base_path.join("pytorch_model.bin")
                    } else {
                        base_path.join("model.safetensors")
                    };
                    (config_file, tokenizer_file, weights_file)
                }
                None => {
                    let Some(model_id) = config.model_id.clone() else {
                        bail!("Either model_id or model_path must be specified");
                    };

                    let repo =
                        Repo::with_revision(model_id, RepoType::Model, config.revision.clone());
                    let api = Api::new()?;
                    let api = api.repo(repo);
                    let config_file = api.get("config.json").await?;
                    let tokenizer_file = api.get("tokenizer.json").await?;
                    let weights_file = if config.use_pth {
                        api.get("pytorch_model.bin").await?
                    } else {
                        api.get("model.safetensors").await?
                    };
                    (config_file, tokenizer_file, weights_file)
                }
            }
        };

        let model_config = std::fs::read_to_string(config_filename)?;
        let model_config: DebertaV2Config = serde_json::from_str(&model_config)?;

        // The endpoint's contract is exactly two classes; refuse anything else
        // at load time rather than serving garbage scores.
        if let Some(id2label) = &model_config.id2label {
            if id2label.len() != LABELS.len() {
                bail!(
                    "Model declares {} output classes, expected {}",
                    id2label.len(),
                    LABELS.len()
                );
            }
        }
        let id2label: Id2Label = LABELS
            .iter()
            .enumerate()
            .map(|(id, label)| (id as u32, label.to_string()))
            .collect();

        let mut tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| anyhow::anyhow!("Tokenizer error: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: config.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Tokenizer truncation error: {e}"))?;

        let vb = if config.use_pth {
            VarBuilder::from_pth(
                &weights_filename,
                candle_transformers::models::debertav2::DTYPE,
                &device,
            )?
        } else {
            unsafe {
                VarBuilder::from_mmaped_safetensors(
                    &[weights_filename],
                    candle_transformers::models::debertav2::DTYPE,
                    &device,
                )?
            }
        };

        let vb = vb.set_prefix("deberta");
        let model = DebertaV2SeqClassificationModel::load(vb, &model_config, Some(id2label))?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

#[async_trait]
impl Engine for ToxicityClassifier {
    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    async fn score(&self, text: &str) -> Result<[f32; 2]> {
        let tokenizer = self.tokenizer.clone();
        let text = text.to_string();
        let encoding = tokio::task::spawn_blocking(move || {
            tokenizer
                .encode(text, true)
                .map_err(|e| anyhow::anyhow!("Tokenization error: {e}"))
        })
        .await??;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;

        let logits = self
            .model
            .forward(&input_ids, Some(token_type_ids), Some(attention_mask))?;
        let logits = logits.squeeze(0)?.to_vec1::<f32>()?;

        match logits.as_slice() {
            &[non_toxic, toxic] => Ok([non_toxic, toxic]),
            other => bail!("Model produced {} logits, expected 2", other.len()),
        }
    }
}

//! Sentence embedding with a local BERT checkpoint on candle.
//!
//! Expects a model directory containing `tokenizer.json`, `config.json`, and
//! either `model.safetensors` or `pytorch_model.bin`. Vectors are masked
//! mean-pooled over the last hidden state and L2-normalized.

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use cityqa_core::error::{Error, Result};
use cityqa_core::traits::TextEmbedder;
use std::collections::HashMap;
use std::path::Path;
use tokenizers::Tokenizer;

const MAX_LEN: usize = 256;
const PAD_TOKEN_ID: u32 = 0;

pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    name: String,
}

impl SentenceEmbedder {
    pub fn load(model_dir: &Path, model_name: &str) -> Result<Self> {
        let device = select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            Error::Embedding(format!("load tokenizer {}: {e}", tokenizer_path.display()))
        })?;

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| Error::Embedding(format!("read {}: {e}", config_path.display())))?;
        let config: BertConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Embedding(format!("parse {}: {e}", config_path.display())))?;
        let dim = config.hidden_size;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)
            .map_err(|e| Error::Embedding(format!("build model: {e}")))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            dim,
            name: model_name.to_string(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Embedding(format!("tokenize: {e}")))?;
        let mut ids = encoding.get_ids().to_vec();
        let mut mask = encoding.get_attention_mask().to_vec();
        if ids.len() > MAX_LEN {
            ids.truncate(MAX_LEN);
            mask.truncate(MAX_LEN);
        }
        while ids.len() < MAX_LEN {
            ids.push(PAD_TOKEN_ID);
            mask.push(0);
        }

        let vector = self
            .forward_pooled(ids, mask)
            .map_err(|e| Error::Embedding(format!("encode: {e}")))?;
        if vector.len() != self.dim {
            return Err(Error::Embedding(format!(
                "pooled width {} does not match hidden size {}",
                vector.len(),
                self.dim
            )));
        }
        Ok(vector)
    }

    fn forward_pooled(&self, ids: Vec<u32>, mask: Vec<u32>) -> candle_core::Result<Vec<f32>> {
        let input_ids = Tensor::from_iter(ids, &self.device)?.reshape((1, MAX_LEN))?;
        let attention_mask = Tensor::from_iter(mask, &self.device)?.reshape((1, MAX_LEN))?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        SentenceEmbedder::embed(self, text)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device) }
            .map_err(|e| Error::Embedding(format!("mmap safetensors: {e}")))?;
        return Ok(vb);
    }

    let pickled = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickled)
        .map_err(|e| Error::Embedding(format!("read {}: {e}", pickled.display())))?;
    let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
    Ok(VarBuilder::from_tensors(weights_map, DTYPE, device))
}

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    if let Ok(device) = Device::new_metal(0) {
        return device;
    }
    Device::Cpu
}

/// Mean-pool hidden states over the unpadded tokens, then L2-normalize.
fn masked_mean_l2(hidden: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = mask.to_dtype(hidden.dtype())?;
    let mask_wide = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;

    let summed = (hidden * &mask_wide)?.sum(1)?;
    let token_counts = mask.sum_keepdim(1)?;
    let mean = summed.broadcast_div(&token_counts)?;

    let eps = Tensor::new(&[1e-12f32], mean.device())?
        .to_dtype(mean.dtype())?
        .unsqueeze(0)?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    mean.broadcast_div(&norm)
}

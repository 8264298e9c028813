//! T5 encoder-decoder generation on candle.
use std::path::PathBuf;
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use tokio::sync::Mutex;
use crate::backend::Backend;
use crate::beam::BeamSearch;
use crate::error::{Error, Result};
use crate::generation::{GenerationCapability, GenerationConfig};
use crate::tensor::operations::token_batch_size;

struct T5State {
    model: T5ForConditionalGeneration,
    device: Device,
}

/// A T5 checkpoint driven by [`BeamSearch`].
///
/// Each source is encoded on its own with trailing pad ids removed, and its beams
/// are decoded against that encoder output only, so a prediction does not depend
/// on what else shares the batch. The decoder is re-run over the full prefix at
/// each step with its kv cache disabled.
pub struct T5Generator {
    weights: Vec<PathBuf>,
    config: Config,
    dtype: DType,
    state: Mutex<T5State>,
}

impl T5Generator {
    /// Memory map safetensors `weights` onto `device`.
    pub fn new(mut config: Config, weights: Vec<PathBuf>, dtype: DType, device: &Device) -> Result<Self> {
        config.use_cache = false;
        let model = load_weights(&config, &weights, dtype, device)?;
        Ok(Self {
            weights,
            config,
            dtype,
            state: Mutex::new(T5State { model, device: device.clone() }),
        })
    }

    /// Wrap an already built model, which must have been loaded with `use_cache` disabled.
    /// It cannot be moved to another device later.
    pub fn from_model(model: T5ForConditionalGeneration, config: Config, device: &Device) -> Self {
        Self {
            weights: vec![],
            config,
            dtype: DType::F32,
            state: Mutex::new(T5State { model, device: device.clone() }),
        }
    }

    pub fn pad_token_id(&self) -> u32 {
        self.config.pad_token_id as u32
    }

    pub fn eos_token_id(&self) -> u32 {
        self.config.eos_token_id as u32
    }
}

fn load_weights(config: &Config, weights: &[PathBuf], dtype: DType, device: &Device) -> Result<T5ForConditionalGeneration> {
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(weights, dtype, device)? };
    Ok(T5ForConditionalGeneration::load(vb, config)?)
}

#[async_trait]
impl GenerationCapability<Tensor> for T5Generator {
    fn decoder_start_token_id(&self) -> u32 {
        self.config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32
    }

    async fn prepare(&self, device: &Device) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.device.same_device(device) {
            return Ok(());
        }
        if self.weights.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "in-memory model on {:?} cannot be moved to {:?}",
                state.device, device
            )));
        }
        log::info!("Moving model to {:?}", device);
        state.model = load_weights(&self.config, &self.weights, self.dtype, device)?;
        state.device = device.clone();
        Ok(())
    }

    async fn generate(&self, input_ids: Tensor, config: &GenerationConfig) -> Result<Tensor> {
        let mut state = self.state.lock().await;
        let device = state.device.clone();
        let pad_token_id = self.pad_token_id();
        let batch_size = token_batch_size(input_ids.dims())?;
        if batch_size == 0 {
            return Tensor::from_token_rows(&[], pad_token_id, &device);
        }

        let model = &mut state.model;
        model.clear_kv_cache();
        let mut encoder_outputs = Vec::with_capacity(batch_size);
        for row in input_ids.to_token_rows()? {
            let ids = Tensor::new(unpadded(&row, pad_token_id), &device)?.unsqueeze(0)?;
            encoder_outputs.push(model.encode(&ids)?);
        }

        let search = BeamSearch::new(config, self.eos_token_id());
        let sequences = search.run(batch_size, |sources, prefixes| {
            let mut log_probs = Vec::with_capacity(prefixes.len());
            let mut offset = 0;
            for group in sources.chunk_by(|a, b| a == b) {
                let beams = &prefixes[offset..offset + group.len()];
                offset += group.len();
                let encoder_output = encoder_outputs[group[0]].repeat((beams.len(), 1, 1))?;
                let decoder_input_ids = Tensor::from_token_rows(beams, pad_token_id, &device)?;
                model.clear_kv_cache();
                let logits = model.decode(&decoder_input_ids, &encoder_output)?;
                let rows = candle_nn::ops::log_softmax(&logits.to_dtype(DType::F32)?, D::Minus1)?;
                log_probs.extend(rows.to_vec2::<f32>()?);
            }
            Ok(log_probs)
        })?;
        model.clear_kv_cache();

        Tensor::from_token_rows(&sequences, pad_token_id, &device)
    }
}

/// `row` without its trailing pad ids; an all-pad row keeps a single pad.
fn unpadded(row: &[u32], pad_token_id: u32) -> &[u32] {
    match row.iter().rposition(|&id| id != pad_token_id) {
        Some(last) => &row[..=last],
        None => &row[..row.len().min(1)],
    }
}

//! Resolving a T5 checkpoint and its tokenizer from a local directory or the Hugging Face hub.
use std::fs;
use std::path::{Path, PathBuf};
use candle_core::{DType, Device};
use candle_transformers::models::t5::Config;
use hf_hub::api::sync::ApiBuilder;
use crate::error::{Error, Result};
use crate::models::t5::T5Generator;
use crate::tokenizer::HfTokenizer;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Files making up a checkpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: Vec<PathBuf>,
}

/// Locate checkpoint files.
///
/// A `model_path` naming an existing directory is used directly: `config.json`,
/// `tokenizer.json`, and either `model.safetensors` or every `*.safetensors` shard
/// in name order. Anything else is treated as a hub repository id and downloaded
/// into `cache_dir` (or the default hub cache).
pub fn resolve_model_files(model_path: &str, cache_dir: Option<&Path>) -> Result<ModelFiles> {
    let local = Path::new(model_path);
    if local.is_dir() {
        return local_model_files(local);
    }

    let mut builder = ApiBuilder::new();
    if let Some(cache_dir) = cache_dir {
        builder = builder.with_cache_dir(cache_dir.to_path_buf());
    }
    let repo = builder.build()?.model(model_path.to_string());
    log::info!("Resolving {} from the hub", model_path);
    Ok(ModelFiles {
        config: repo.get(CONFIG_FILE)?,
        tokenizer: repo.get(TOKENIZER_FILE)?,
        weights: vec![repo.get(WEIGHTS_FILE)?],
    })
}

fn local_model_files(dir: &Path) -> Result<ModelFiles> {
    let single = dir.join(WEIGHTS_FILE);
    let weights = if single.is_file() {
        vec![single]
    } else {
        let mut shards: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "safetensors"))
            .collect();
        shards.sort();
        shards
    };
    if weights.is_empty() {
        return Err(Error::InvalidConfig(format!("no safetensors weights in {}", dir.display())));
    }
    Ok(ModelFiles {
        config: dir.join(CONFIG_FILE),
        tokenizer: dir.join(TOKENIZER_FILE),
        weights,
    })
}

/// Load a T5 model onto the host and its tokenizer, truncating inputs to `max_input_length`.
///
/// The model is moved to the compute device by
/// [`GenerationCapability::prepare`](crate::generation::GenerationCapability::prepare).
pub fn load_model(model_path: &str, cache_dir: Option<&Path>, max_input_length: usize) -> Result<(T5Generator, HfTokenizer)> {
    let files = resolve_model_files(model_path, cache_dir)?;
    let config: Config = serde_json::from_slice(&fs::read(&files.config)?)?;
    let tokenizer = HfTokenizer::from_file(&files.tokenizer, max_input_length)?;
    let model = T5Generator::new(config, files.weights, DType::F32, &Device::Cpu)?;
    log::info!("Loaded model from {}", model_path);
    Ok((model, tokenizer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_directory_single_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(WEIGHTS_FILE), b"").unwrap();

        let files = resolve_model_files(dir.path().to_str().unwrap(), None).unwrap();

        assert_eq!(files.config, dir.path().join(CONFIG_FILE));
        assert_eq!(files.tokenizer, dir.path().join(TOKENIZER_FILE));
        assert_eq!(files.weights, vec![dir.path().join(WEIGHTS_FILE)]);
    }

    #[test]
    fn test_local_directory_shards_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["model-00002-of-00002.safetensors", "model-00001-of-00002.safetensors", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = resolve_model_files(dir.path().to_str().unwrap(), None).unwrap();

        assert_eq!(
            files.weights,
            vec![
                dir.path().join("model-00001-of-00002.safetensors"),
                dir.path().join("model-00002-of-00002.safetensors"),
            ]
        );
    }

    #[test]
    fn test_local_directory_without_weights() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_model_files(dir.path().to_str().unwrap(), None).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

use std::path::PathBuf;
use anyhow::{bail, Result};
use clap::Parser;
use kamado::dataset::DEFAULT_INPUT_FIELD;

/// Generate predictions for a held-out split with a pretrained encoder-decoder model.
#[derive(Parser, Debug)]
#[command(name = "kamado-run", version, about)]
pub struct Args {
    /// Local checkpoint directory or Hugging Face repo id
    #[arg(long)]
    pub model_path: String,

    /// Directory hub downloads are cached in
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Encoder inputs are truncated to this many tokens
    #[arg(long, default_value_t = 512)]
    pub max_input_length: usize,

    /// JSONL file, or directory holding `<split>.jsonl`
    #[arg(long)]
    pub data_path: PathBuf,

    /// Dataset split to generate for
    #[arg(long, default_value = "test")]
    pub split: String,

    /// Record field tokenized as encoder input
    #[arg(long, default_value = DEFAULT_INPUT_FIELD)]
    pub input_field: String,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Maximum number of generated tokens
    #[arg(long, default_value_t = 512)]
    pub max_gen_length: usize,

    /// Minimum number of generated tokens
    #[arg(long, default_value_t = 0)]
    pub min_gen_length: usize,

    /// Where the JSON array of predictions is written
    #[arg(long)]
    pub output_file: PathBuf,

    /// Run on the CPU even if an accelerator is available
    #[arg(long)]
    pub cpu: bool,
}

impl Args {
    /// Reject settings that would only fail after the model is loaded
    pub fn validate(&self) -> Result<()> {
        if self.min_gen_length > self.max_gen_length {
            bail!(
                "--min-gen-length ({}) must not exceed --max-gen-length ({})",
                self.min_gen_length,
                self.max_gen_length
            );
        }
        if self.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        Ok(())
    }
}

mod args;

use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use clap::Parser;
use futures::stream;
use kamado::dataset::{load_dataset, DataLoader, PaddingCollator, TextEncoder};
use kamado::loader::load_model;
use crate::args::Args;

fn select_device(force_cpu: bool) -> Result<Device> {
    if force_cpu {
        return Ok(Device::Cpu);
    }
    Ok(Device::cuda_if_available(0)?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    args.validate()?;

    let (model, tokenizer) = load_model(&args.model_path, args.cache_dir.as_deref(), args.max_input_length)
        .with_context(|| format!("loading model {}", args.model_path))?;

    let examples = load_dataset(&args.data_path, &tokenizer, &args.split, args.max_input_length, &args.input_field)
        .with_context(|| format!("loading dataset {}", args.data_path.display()))?;
    let collator = PaddingCollator::<Tensor>::new(tokenizer.pad_token_id(), Device::Cpu);
    let loader = DataLoader::new(examples, args.batch_size, collator)?;

    let device = select_device(args.cpu)?;
    log::info!("Generating on {:?}", device);
    let predictions = kamado::generate(
        &model,
        &tokenizer,
        stream::iter(loader),
        &device,
        args.max_gen_length,
        args.min_gen_length,
    )
    .await?;

    kamado::write_predictions(&predictions, &args.output_file)
        .with_context(|| format!("writing {}", args.output_file.display()))?;
    println!("Predictions saved to {}", args.output_file.display());
    Ok(())
}

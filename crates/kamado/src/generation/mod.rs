//! # Generation
//!
//! Batched beam-search generation over a dataset of encoder inputs.
//!
//! ## Key Components
//!
//! * [`GenerationCapability`] - A trait for models that generate decoder token ids from encoder inputs
//! * [`TextDecoder`] - A trait for turning generated ids back into text
//! * [`GenerationConfig`] - Validated decoding parameters
//! * [`generate`] - The batch loop producing one prediction per example, in source order
//!
//! # Example
//!
//! ```ignore
//! # use kamado::error::Result;
//! use kamado::generation::{generate, GenerationCapability, GenerationConfig, TextDecoder};
//! use kamado::batch::Batch;
//! use kamado::backend::Backend;
//! use candle_core::{Device, Tensor};
//! use async_trait::async_trait;
//! use futures::stream;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl GenerationCapability<Tensor> for Echo {
//!     fn decoder_start_token_id(&self) -> u32 { 0 }
//!
//!     async fn generate(&self, input_ids: Tensor, _config: &GenerationConfig) -> Result<Tensor> {
//!         Ok(input_ids)
//!     }
//! }
//!
//! struct Digits;
//!
//! impl TextDecoder for Digits {
//!     fn batch_decode(&self, sequences: &[Vec<u32>], _skip: bool) -> Result<Vec<String>> {
//!         Ok(sequences.iter().map(|s| format!("{:?}", s)).collect())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let device = Device::Cpu;
//! let batch = Batch::from_input_ids(Tensor::from_token_rows(&[vec![1, 2], vec![3]], 0, &device)?);
//! let predictions = generate(&Echo, &Digits, stream::iter(vec![Ok(batch)]), &device, 16, 0).await?;
//! assert_eq!(predictions, vec!["[1, 2]", "[3, 0]"]);
//! # Ok(())
//! # }
//! ```

mod config;
mod core_trait;
mod engine;
mod progress;

pub use config::*;
pub use core_trait::*;
pub use engine::{generate, generate_with_config};

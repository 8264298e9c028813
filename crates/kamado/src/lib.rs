//! # Kamado
//!
//! Batched beam-search generation with encoder-decoder models over a held-out
//! dataset, persisted as a JSON array of predictions.
//!
//! ## Overview
//!
//! Kamado walks a dataset one batch at a time, hands each batch's `input_ids` to a
//! generation-capable model on the selected device, decodes the generated ids back
//! to text, and collects one prediction per example in dataset order. The final
//! list is written to disk in a single step once every batch has been generated.
//!
//! Key components include:
//!
//! - A tensor abstraction layer supporting various backends
//! - A sequential batch generation engine
//! - A backend-agnostic beam search
//! - Dataset loading and padding collation
//! - A prediction writer tolerant of a missing output directory
//!
//! ## Architecture
//!
//! ### Assumptions
//! Regardless of backend used, kamado reserves two dimensions with special meanings:
//!  - The `0th` dimension is reserved as the batch dimension
//!  - The `1st` dimension is reserved as the sequence dimension
//!
//! ### Backend Traits
//!
//! The [`backend::Backend`] trait defines the interface any token tensor
//! implementation must satisfy. Generation logic stays independent of the
//! concrete tensor library.
//!
//! ### Generation
//!
//! [`generation::GenerationCapability`] is the model seam and
//! [`generation::TextDecoder`] the tokenizer seam. [`generation::generate`] drives
//! both over a stream of [`batch::Batch`]es.
//!
//! ## Features
//!
//! - **candle** - Enables candle backend
//! - **burn** - Enables burn backend
//! - **t5** - Enables the candle T5 model, `tokenizers` integration and hub loading
//!
//! ## Errors
//!
//! Every fallible operation returns [`error::Result`]. Only a missing output
//! directory is recovered from; everything else aborts the run.


mod tensor;

pub mod backend;
pub mod batch;
pub mod beam;
pub mod dataset;
pub mod error;
pub mod generation;
pub mod output;

/// Constants for client reference
pub use tensor::constant;

#[cfg_attr(docsrs, doc(cfg(feature = "t5")))]
#[cfg(feature = "t5")]
pub mod models;

#[cfg_attr(docsrs, doc(cfg(feature = "t5")))]
#[cfg(feature = "t5")]
pub mod tokenizer;

#[cfg_attr(docsrs, doc(cfg(feature = "t5")))]
#[cfg(feature = "t5")]
pub mod loader;

pub use error::{Error, Result};
pub use generation::generate;
pub use output::write_predictions;

//! # Dataset
//!
//! Loading held-out examples, collating them into padded [`Batch`](crate::batch::Batch)es,
//! and iterating them in dataset order.

mod collate;
mod loader;

pub use collate::{Collator, DataLoader, PaddingCollator};
pub use loader::{load_dataset, parse_examples, resolve_split_path, Example, TextEncoder, DEFAULT_INPUT_FIELD};

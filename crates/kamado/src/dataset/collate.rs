use std::marker::PhantomData;
use crate::backend::Backend;
use crate::batch::Batch;
use crate::error::{Error, Result};
use super::Example;

/// Groups individual examples into a single [`Batch`].
pub trait Collator<B>
where B: Backend
{
    fn collate(&self, examples: &[Example]) -> Result<Batch<B>>;
}

/// Right pads every example to the longest `input_ids` in the batch.
#[derive(Debug, Clone)]
pub struct PaddingCollator<B>
where B: Backend
{
    pad_token_id: u32,
    device: B::Device,
}

impl<B> PaddingCollator<B>
where B: Backend
{
    /// Collated tensors are built on `device`, usually the host
    pub fn new(pad_token_id: u32, device: B::Device) -> Self {
        Self { pad_token_id, device }
    }
}

impl<B> Collator<B> for PaddingCollator<B>
where B: Backend
{
    fn collate(&self, examples: &[Example]) -> Result<Batch<B>> {
        let rows: Vec<Vec<u32>> = examples.iter().map(|e| e.input_ids.clone()).collect();
        let input_ids = B::from_token_rows(&rows, self.pad_token_id, &self.device)?;
        Ok(Batch::from_input_ids(input_ids))
    }
}

/// Iterates a dataset in order, `batch_size` examples at a time.
///
/// The final batch holds the remainder and may be smaller.
pub struct DataLoader<B, C> {
    examples: Vec<Example>,
    batch_size: usize,
    position: usize,
    collator: C,
    _marker: PhantomData<B>,
}

impl<B, C> DataLoader<B, C>
where B: Backend, C: Collator<B>
{
    pub fn new(examples: Vec<Example>, batch_size: usize, collator: C) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        Ok(Self { examples, batch_size, position: 0, collator, _marker: PhantomData })
    }

    /// Total number of batches this loader yields
    pub fn num_batches(&self) -> usize {
        self.examples.len().div_ceil(self.batch_size)
    }
}

impl<B, C> Iterator for DataLoader<B, C>
where B: Backend, C: Collator<B>
{
    type Item = Result<Batch<B>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.examples.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.examples.len());
        let batch = self.collator.collate(&self.examples[self.position..end]);
        self.position = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.examples.len() - self.position).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

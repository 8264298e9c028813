//! # Batch
//!
//! A collated group of examples, keyed by field name. Every field is a
//! `(batch, seq)` token tensor; generation only ever reads [`INPUT_IDS`].
use std::collections::HashMap;
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::tensor::operations::token_batch_size;

/// The field holding encoder input token ids
pub const INPUT_IDS: &str = "input_ids";

#[derive(Debug, Clone)]
pub struct Batch<B> {
    fields: HashMap<String, B>,
}

impl<B> Default for Batch<B> {
    fn default() -> Self {
        Self { fields: HashMap::new() }
    }
}

impl<B> Batch<B>
where B: Backend
{
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch holding only `input_ids`
    pub fn from_input_ids(input_ids: B) -> Self {
        let mut batch = Self::new();
        batch.insert(INPUT_IDS, input_ids);
        batch
    }

    /// Insert a field, returning the tensor previously stored under `name`
    pub fn insert(&mut self, name: impl Into<String>, tensor: B) -> Option<B> {
        self.fields.insert(name.into(), tensor)
    }

    pub fn get(&self, name: &str) -> Option<&B> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Drop every field not named in `keep`
    pub fn retain_fields(&mut self, keep: &[&str]) {
        self.fields.retain(|name, _| keep.contains(&name.as_str()));
    }

    pub fn input_ids(&self) -> Result<&B> {
        self.get(INPUT_IDS)
            .ok_or_else(|| Error::MissingField(INPUT_IDS.to_string()))
    }

    /// Consume the batch, keeping only its `input_ids`
    pub fn into_input_ids(mut self) -> Result<B> {
        self.fields
            .remove(INPUT_IDS)
            .ok_or_else(|| Error::MissingField(INPUT_IDS.to_string()))
    }

    /// Number of examples, read from the batch dimension of `input_ids`
    pub fn num_examples(&self) -> Result<usize> {
        token_batch_size(&self.input_ids()?.shape())
    }
}

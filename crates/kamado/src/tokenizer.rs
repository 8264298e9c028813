//! `tokenizers`-backed text encoding and decoding.
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};
use crate::dataset::TextEncoder;
use crate::error::{Error, Result};
use crate::generation::TextDecoder;

const PAD_TOKEN: &str = "<pad>";

/// A Hugging Face tokenizer, truncating encoder inputs to a fixed length.
#[derive(Clone)]
pub struct HfTokenizer {
    tokenizer: Tokenizer,
    max_input_length: usize,
    pad_token_id: u32,
}

impl HfTokenizer {
    /// Load `tokenizer.json`, truncating encodings to `max_input_length` ids
    pub fn from_file(path: impl AsRef<Path>, max_input_length: usize) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path.as_ref()).map_err(|e| Error::Tokenizer(e.to_string()))?;
        Self::new(tokenizer, max_input_length)
    }

    pub fn new(mut tokenizer: Tokenizer, max_input_length: usize) -> Result<Self> {
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_input_length,
                ..Default::default()
            }))
            .map_err(|e| Error::Tokenizer(e.to_string()))?;
        let pad_token_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id(PAD_TOKEN))
            .unwrap_or(0);
        Ok(Self { tokenizer, max_input_length, pad_token_id })
    }
}

impl TextEncoder for HfTokenizer {
    /// Truncation happens before special tokens are added, so a trailing `</s>` survives.
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>> {
        let encoding = if max_length < self.max_input_length {
            let mut tokenizer = self.tokenizer.clone();
            tokenizer
                .with_truncation(Some(TruncationParams { max_length, ..Default::default() }))
                .map_err(|e| Error::Tokenizer(e.to_string()))?;
            tokenizer.encode(text, true)
        } else {
            self.tokenizer.encode(text, true)
        };
        let encoding = encoding.map_err(|e| Error::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }
}

impl TextDecoder for HfTokenizer {
    fn batch_decode(&self, sequences: &[Vec<u32>], skip_special_tokens: bool) -> Result<Vec<String>> {
        let slices: Vec<&[u32]> = sequences.iter().map(Vec::as_slice).collect();
        self.tokenizer
            .decode_batch(&slices, skip_special_tokens)
            .map_err(|e| Error::Tokenizer(e.to_string()))
    }
}

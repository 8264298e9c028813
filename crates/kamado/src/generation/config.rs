use crate::error::{Error, Result};

/// Beam count used for every generation call
pub const DEFAULT_NUM_BEAMS: usize = 5;

/// Decoding parameters handed to [`GenerationCapability::generate`](super::GenerationCapability::generate).
///
/// A config is immutable once built; constructors reject `min_new_tokens > max_new_tokens`
/// and a zero beam count.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    max_new_tokens: usize,
    min_new_tokens: usize,
    num_beams: usize,
    early_stopping: bool,
    decoder_start_token_id: u32,
    length_penalty: f32,
}

impl GenerationConfig {
    /// Beam search with [`DEFAULT_NUM_BEAMS`] beams and early stopping enabled.
    pub fn new(max_new_tokens: usize, min_new_tokens: usize, decoder_start_token_id: u32) -> Result<Self> {
        if min_new_tokens > max_new_tokens {
            return Err(Error::InvalidConfig(format!(
                "min_new_tokens ({}) exceeds max_new_tokens ({})",
                min_new_tokens, max_new_tokens
            )));
        }
        Ok(Self {
            max_new_tokens,
            min_new_tokens,
            num_beams: DEFAULT_NUM_BEAMS,
            early_stopping: true,
            decoder_start_token_id,
            length_penalty: 1.0,
        })
    }

    pub fn with_num_beams(self, num_beams: usize) -> Result<Self> {
        if num_beams == 0 {
            return Err(Error::InvalidConfig("num_beams must be at least 1".to_string()));
        }
        Ok(Self { num_beams, ..self })
    }

    pub fn with_early_stopping(self, early_stopping: bool) -> Self {
        Self { early_stopping, ..self }
    }

    /// Exponent applied to hypothesis length when ranking finished beams
    pub fn with_length_penalty(self, length_penalty: f32) -> Self {
        Self { length_penalty, ..self }
    }

    pub fn max_new_tokens(&self) -> usize {
        self.max_new_tokens
    }

    pub fn min_new_tokens(&self) -> usize {
        self.min_new_tokens
    }

    pub fn num_beams(&self) -> usize {
        self.num_beams
    }

    pub fn early_stopping(&self) -> bool {
        self.early_stopping
    }

    pub fn decoder_start_token_id(&self) -> u32 {
        self.decoder_start_token_id
    }

    pub fn length_penalty(&self) -> f32 {
        self.length_penalty
    }
}

use thiserror::Error;

/// Errors produced while generating or persisting predictions.
///
/// Only a missing output directory is recovered from (see
/// [`write_predictions`](crate::output::write_predictions)); every other
/// variant is fatal to a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid generation config: {0}")]
    InvalidConfig(String),

    #[error("Batch is missing field `{0}`")]
    MissingField(String),

    #[error("Malformed batch: expected a (batch, seq) token tensor, got shape {0:?}")]
    MalformedBatch(Vec<usize>),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Dataset error at line {line}: {reason}")]
    Dataset { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "candle")]
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[cfg(feature = "t5")]
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[cfg(feature = "t5")]
    #[error("Hub error: {0}")]
    Hub(#[from] hf_hub::api::sync::ApiError),
}

impl Error {
    /// Whether this error means a path component does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

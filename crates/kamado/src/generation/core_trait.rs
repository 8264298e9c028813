use async_trait::async_trait;
use crate::backend::Backend;
use crate::error::Result;
use super::GenerationConfig;

/// # GenerationCapability
///
/// A sequence-to-sequence model that turns encoder input ids into generated
/// decoder token ids.
///
/// ## Input/Output Dimensions
///
/// `generate` receives `input_ids` of shape `(batch, seq)` already placed on
/// the engine's device, and returns generated ids of shape `(batch, gen_seq)`.
/// Row `i` of the output must belong to row `i` of the input. Rows shorter than
/// `gen_seq` are padded with a special token that the [`TextDecoder`] drops.
///
/// ## Implementation Notes
///
/// - Calls are independent: no key/value cache or other per-sequence state may
///   survive from one `generate` call to the next.
/// - Inference only; implementations never update parameters.
/// - Errors (out of memory, bad shapes) are returned, the engine does not retry.
#[async_trait]
pub trait GenerationCapability<B>: Send + Sync
where B: Backend
{
    /// Token id used to seed the decoder
    fn decoder_start_token_id(&self) -> u32;

    /// Switch to inference mode and place the model on `device`.
    ///
    /// Called once, before the first batch.
    async fn prepare(&self, _device: &B::Device) -> Result<()> {
        Ok(())
    }

    /// Run beam search decoding over a batch of encoder inputs.
    async fn generate(&self, input_ids: B, config: &GenerationConfig) -> Result<B>;
}

/// Turns generated token ids back into text.
pub trait TextDecoder: Send + Sync {
    /// Decode each sequence to a string, optionally dropping special and control tokens.
    ///
    /// Must return exactly one string per input sequence, in order.
    fn batch_decode(&self, sequences: &[Vec<u32>], skip_special_tokens: bool) -> Result<Vec<String>>;
}

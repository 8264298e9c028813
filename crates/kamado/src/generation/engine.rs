use std::pin::pin;
use futures::{Stream, StreamExt};
use crate::backend::Backend;
use crate::batch::Batch;
use crate::error::{Error, Result};
use crate::tensor::operations::token_batch_size;
use super::progress::Progress;
use super::{GenerationCapability, GenerationConfig, TextDecoder};

/// Generate one prediction per example in `batches`, in source order.
///
/// Decoding runs with [`DEFAULT_NUM_BEAMS`](super::DEFAULT_NUM_BEAMS) beams, early stopping,
/// and the model's own decoder start token. `min_gen_length > max_gen_length` is rejected
/// with [`Error::InvalidConfig`] before the model is touched.
pub async fn generate<M, D, B, S>(
    model: &M,
    decoder: &D,
    batches: S,
    device: &B::Device,
    max_gen_length: usize,
    min_gen_length: usize,
) -> Result<Vec<String>>
where
    M: GenerationCapability<B>,
    D: TextDecoder,
    B: Backend,
    S: Stream<Item = Result<Batch<B>>>,
{
    let config = GenerationConfig::new(max_gen_length, min_gen_length, model.decoder_start_token_id())?;
    generate_with_config(model, decoder, batches, device, &config).await
}

/// Same as [`generate`], with explicit decoding parameters.
///
/// Batches are processed strictly one at a time: each batch's `input_ids` are
/// moved to `device`, generated from, and decoded before the next batch is pulled.
/// The first error from the batch source, the model or the decoder aborts the run
/// and no partial predictions are returned.
pub async fn generate_with_config<M, D, B, S>(
    model: &M,
    decoder: &D,
    batches: S,
    device: &B::Device,
    config: &GenerationConfig,
) -> Result<Vec<String>>
where
    M: GenerationCapability<B>,
    D: TextDecoder,
    B: Backend,
    S: Stream<Item = Result<Batch<B>>>,
{
    model.prepare(device).await?;

    let mut batches = pin!(batches);
    let mut progress = Progress::new("Generating predictions", batches.size_hint().1);
    let mut predictions = Vec::new();

    while let Some(batch) = batches.next().await {
        let input_ids = batch?.into_input_ids()?;
        let num_examples = token_batch_size(&input_ids.shape())?;
        let input_ids = input_ids.to_device(device)?;

        let generated = model.generate(input_ids, config).await?;
        let sequences = generated.to_token_rows()?;
        if sequences.len() != num_examples {
            return Err(Error::Generation(format!(
                "model returned {} sequences for a batch of {}",
                sequences.len(),
                num_examples
            )));
        }

        let decoded = decoder.batch_decode(&sequences, true)?;
        if decoded.len() != sequences.len() {
            return Err(Error::Decode(format!(
                "decoder returned {} strings for {} sequences",
                decoded.len(),
                sequences.len()
            )));
        }
        predictions.extend(decoded);
        progress.tick(num_examples);
    }

    progress.finish();
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock_tensor::{MockDevice, MockTensor};
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Returns a fixed token per example; optionally echoes the first input token instead
    #[derive(Default)]
    struct MockModel {
        echo: bool,
        fail_on_call: Option<usize>,
        prepared: AtomicUsize,
        calls: AtomicUsize,
        seen: Mutex<Vec<(MockDevice, GenerationConfig)>>,
    }

    #[async_trait]
    impl GenerationCapability<MockTensor> for MockModel {
        fn decoder_start_token_id(&self) -> u32 {
            0
        }

        async fn prepare(&self, _device: &MockDevice) -> Result<()> {
            self.prepared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn generate(&self, input_ids: MockTensor, config: &GenerationConfig) -> Result<MockTensor> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_call == Some(call) {
                return Err(Error::Generation("out of memory".to_string()));
            }
            self.seen.lock().unwrap().push((input_ids.device.clone(), config.clone()));
            let rows: Vec<Vec<u32>> = input_ids
                .to_token_rows()?
                .into_iter()
                .map(|row| if self.echo { vec![0, row[0], 1] } else { vec![0, 7, 1] })
                .collect();
            MockTensor::from_token_rows(&rows, 2, &input_ids.device)
        }
    }

    // Token 7 decodes to "X", specials 0..=2 are dropped, anything else to its number
    struct MockDecoder;

    impl TextDecoder for MockDecoder {
        fn batch_decode(&self, sequences: &[Vec<u32>], skip_special_tokens: bool) -> Result<Vec<String>> {
            Ok(sequences
                .iter()
                .map(|seq| {
                    seq.iter()
                        .filter(|&&t| !(skip_special_tokens && t <= 2))
                        .map(|&t| if t == 7 { "X".to_string() } else { t.to_string() })
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect())
        }
    }

    fn batch_of(ids: &[u32]) -> Result<Batch<MockTensor>> {
        let rows: Vec<Vec<u32>> = ids.iter().map(|&id| vec![id, id]).collect();
        Ok(Batch::from_input_ids(MockTensor::from_token_rows(&rows, 0, &MockDevice::Cpu)?))
    }

    #[tokio::test]
    async fn test_fixed_output_for_every_example() {
        let model = MockModel::default();
        let batches = stream::iter(vec![batch_of(&[10, 11, 12]), batch_of(&[13, 14])]);

        let predictions = generate(&model, &MockDecoder, batches, &MockDevice::Cpu, 20, 2).await.unwrap();

        assert_eq!(predictions, vec!["X", "X", "X", "X", "X"]);
    }

    #[tokio::test]
    async fn test_order_preserved_across_batches() {
        let model = MockModel { echo: true, ..Default::default() };
        let batches = stream::iter(vec![
            batch_of(&[10, 11]),
            batch_of(&[12]),
            batch_of(&[13, 14, 15]),
        ]);

        let predictions = generate(&model, &MockDecoder, batches, &MockDevice::Cpu, 20, 0).await.unwrap();

        assert_eq!(predictions, vec!["10", "11", "12", "13", "14", "15"]);
    }

    #[tokio::test]
    async fn test_empty_source_yields_no_predictions() {
        let model = MockModel::default();
        let batches = stream::iter(Vec::<Result<Batch<MockTensor>>>::new());

        let predictions = generate(&model, &MockDecoder, batches, &MockDevice::Cpu, 20, 0).await.unwrap();

        assert!(predictions.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inputs_moved_to_device_and_config_forwarded() {
        let model = MockModel::default();
        let batches = stream::iter(vec![batch_of(&[10]), batch_of(&[11])]);

        generate(&model, &MockDecoder, batches, &MockDevice::Accelerator, 64, 8).await.unwrap();

        assert_eq!(model.prepared.load(Ordering::SeqCst), 1);
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for (device, config) in seen.iter() {
            assert_eq!(*device, MockDevice::Accelerator);
            assert_eq!(config.max_new_tokens(), 64);
            assert_eq!(config.min_new_tokens(), 8);
            assert_eq!(config.num_beams(), 5);
            assert!(config.early_stopping());
            assert_eq!(config.decoder_start_token_id(), 0);
        }
    }

    #[tokio::test]
    async fn test_min_above_max_rejected_before_generation() {
        let model = MockModel::default();
        let batches = stream::iter(vec![batch_of(&[10])]);

        let err = generate(&model, &MockDecoder, batches, &MockDevice::Cpu, 4, 5).await.unwrap_err();

        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(model.prepared.load(Ordering::SeqCst), 0);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let model = MockModel { fail_on_call: Some(1), ..Default::default() };
        let batches = stream::iter(vec![batch_of(&[10]), batch_of(&[11]), batch_of(&[12])]);

        let err = generate(&model, &MockDecoder, batches, &MockDevice::Cpu, 20, 0).await.unwrap_err();

        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batch_source_error_propagates() {
        let model = MockModel::default();
        let batches = stream::iter(vec![
            batch_of(&[10]),
            Err(Error::Dataset { line: 2, reason: "bad json".to_string() }),
        ]);

        let err = generate(&model, &MockDecoder, batches, &MockDevice::Cpu, 20, 0).await.unwrap_err();

        assert!(matches!(err, Error::Dataset { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_missing_and_malformed_input_ids() {
        let model = MockModel::default();
        let mut no_ids = Batch::new();
        no_ids.insert("labels", MockTensor::filled(1, 1, 3));
        let err = generate(&model, &MockDecoder, stream::iter(vec![Ok(no_ids)]), &MockDevice::Cpu, 20, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingField(_)));

        let flat = Batch::from_input_ids(MockTensor::new(vec![3], vec![1, 2, 3]));
        let err = generate(&model, &MockDecoder, stream::iter(vec![Ok(flat)]), &MockDevice::Cpu, 20, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedBatch(_)));
    }

    #[tokio::test]
    async fn test_decoder_count_mismatch_is_an_error() {
        struct Short;
        impl TextDecoder for Short {
            fn batch_decode(&self, _sequences: &[Vec<u32>], _skip: bool) -> Result<Vec<String>> {
                Ok(vec![])
            }
        }
        let model = MockModel::default();
        let err = generate(&model, &Short, stream::iter(vec![batch_of(&[10])]), &MockDevice::Cpu, 20, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
    #[tokio::test]
    async fn test_dataset_to_file() {
        use crate::dataset::{DataLoader, Example, PaddingCollator};
        use crate::output::write_predictions;

        let examples: Vec<Example> = (20..25).map(|id| Example { input_ids: vec![id, 5, 5] }).collect();
        let loader = DataLoader::new(examples, 3, PaddingCollator::<MockTensor>::new(0, MockDevice::Cpu)).unwrap();
        let model = MockModel { echo: true, ..Default::default() };

        let predictions = generate(&model, &MockDecoder, stream::iter(loader), &MockDevice::Cpu, 20, 0)
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds").join("out.json");
        write_predictions(&predictions, &path).unwrap();

        let written: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, vec!["20", "21", "22", "23", "24"]);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_dataset_writes_empty_array() {
        use crate::dataset::{DataLoader, PaddingCollator};
        use crate::output::write_predictions;

        let loader = DataLoader::new(vec![], 4, PaddingCollator::<MockTensor>::new(0, MockDevice::Cpu)).unwrap();
        let predictions = generate(&MockModel::default(), &MockDecoder, stream::iter(loader), &MockDevice::Cpu, 20, 0)
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_predictions(&predictions, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}

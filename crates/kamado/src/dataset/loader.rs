use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use serde::Deserialize;
use serde_json::{Map, Value};
use crate::batch::INPUT_IDS;
use crate::error::{Error, Result};

/// Text field tokenized when a record carries no precomputed `input_ids`
pub const DEFAULT_INPUT_FIELD: &str = "original_report";

/// Turns raw text into encoder input ids.
pub trait TextEncoder: Send + Sync {
    /// Tokenize `text`, truncating to at most `max_length` ids.
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>>;

    /// Id used to right pad shorter sequences in a batch
    fn pad_token_id(&self) -> u32;
}

/// A single preprocessed example. Every other column of the source record is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub input_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    input_ids: Option<Vec<u32>>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Resolve the JSONL file for `split`: `path` itself if it is a file, otherwise
/// `<path>/<split>.jsonl`.
pub fn resolve_split_path(path: &Path, split: &str) -> PathBuf {
    if path.is_dir() {
        path.join(format!("{}.jsonl", split))
    } else {
        path.to_path_buf()
    }
}

/// Load and tokenize the `split` examples under `path`, preserving file order.
pub fn load_dataset<E>(
    path: impl AsRef<Path>,
    encoder: &E,
    split: &str,
    max_length: usize,
    input_field: &str,
) -> Result<Vec<Example>>
where E: TextEncoder + ?Sized
{
    let file = resolve_split_path(path.as_ref(), split);
    log::info!("Loading {} split from {}", split, file.display());
    let reader = BufReader::new(File::open(&file)?);
    let examples = parse_examples(reader, encoder, max_length, input_field)?;
    log::info!("Loaded {} examples", examples.len());
    Ok(examples)
}

/// Parse JSON lines into examples.
///
/// Records carrying an `input_ids` array are used as is (truncated to
/// `max_length`); otherwise `input_field` is tokenized. Blank lines are skipped.
pub fn parse_examples<R, E>(reader: R, encoder: &E, max_length: usize, input_field: &str) -> Result<Vec<Example>>
where
    R: BufRead,
    E: TextEncoder + ?Sized,
{
    let mut examples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .map_err(|e| Error::Dataset { line: line_no, reason: e.to_string() })?;

        let input_ids = match record.input_ids {
            Some(mut ids) => {
                ids.truncate(max_length);
                ids
            }
            None => {
                let text = record
                    .fields
                    .get(input_field)
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Dataset {
                        line: line_no,
                        reason: format!("expected string field `{}` or `{}`", input_field, INPUT_IDS),
                    })?;
                encoder.encode(text, max_length)?
            }
        };
        examples.push(Example { input_ids });
    }
    Ok(examples)
}

//! # Output
//!
//! Persists predictions as a single JSON array of strings.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::error::Result;

/// Write `predictions` to `path` as a JSON array, in order.
///
/// If the first attempt fails because a directory on the way to `path` does not
/// exist, the full parent directory chain is created and the write is retried
/// exactly once. Any other failure is returned as is. An existing file is
/// overwritten.
pub fn write_predictions<P>(predictions: &[String], path: P) -> Result<()>
where P: AsRef<Path>
{
    let path = path.as_ref();
    match try_write(predictions, path) {
        Err(err) if err.is_not_found() => {
            let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
            match parent {
                Some(parent) => {
                    log::debug!("Creating output directory {}", parent.display());
                    fs::create_dir_all(parent)?;
                    try_write(predictions, path)
                }
                None => Err(err),
            }
        }
        result => result,
    }
}

fn try_write(predictions: &[String], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, predictions)?;
    writer.flush()?;
    Ok(())
}

use crate::constant::{BATCH_DIM, TOKEN_RANK};
use crate::error::{Error, Result};

#[cfg(any(feature = "candle", feature = "burn", test))]
/// Flatten `rows` into a row-major buffer of width equal to the longest row,
/// right padding shorter rows with `pad_token_id`.
///
/// Returns the buffer and the padded width.
pub(crate) fn pad_rows(rows: &[Vec<u32>], pad_token_id: u32) -> (Vec<u32>, usize) {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * width);
    for row in rows {
        flat.extend_from_slice(row);
        flat.extend(std::iter::repeat_n(pad_token_id, width - row.len()));
    }
    (flat, width)
}

#[cfg(any(feature = "burn", test))]
/// Split a row-major buffer of `batch` rows back into one vector per row.
pub(crate) fn unflatten_rows<T: Copy>(flat: &[T], batch: usize) -> Vec<Vec<T>> {
    if batch == 0 {
        return vec![];
    }
    let width = flat.len() / batch;
    if width == 0 {
        return vec![vec![]; batch];
    }
    flat.chunks(width).map(<[T]>::to_vec).collect()
}

/// Narrow a backend's signed token id, rejecting values outside the `u32` range.
#[cfg(any(feature = "candle", feature = "burn"))]
pub(crate) fn token_id(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Decode(format!("token id {} out of range", value)))
}

/// Validate that `shape` is a `(batch, seq)` token shape and return the batch size.
pub(crate) fn token_batch_size(shape: &[usize]) -> Result<usize> {
    if shape.len() != TOKEN_RANK {
        return Err(Error::MalformedBatch(shape.to_vec()));
    }
    Ok(shape[BATCH_DIM])
}

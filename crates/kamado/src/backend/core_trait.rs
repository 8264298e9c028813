use std::fmt::Debug;
use crate::error::Result;

/// The backend trait that must be fulfilled by any tensor type carrying token ids.
///
/// Token tensors are always rank 2, `(batch, seq)`, see [`crate::constant`].
pub trait Backend: Debug + Clone + Send + Sync + 'static {
    /// The compute target this backend places tensors on
    type Device: Debug + Clone + Send + Sync + 'static;

    /// Return the shape of this tensor
    fn shape(&self) -> Vec<usize>;

    /// Return the device this tensor currently lives on
    fn device(&self) -> Self::Device;

    /// Copy this tensor onto `device`
    fn to_device(&self, device: &Self::Device) -> Result<Self>;

    /// Build a `(rows, longest_row)` tensor, right padding shorter rows with `pad_token_id`
    fn from_token_rows(rows: &[Vec<u32>], pad_token_id: u32, device: &Self::Device) -> Result<Self>;

    /// Read a rank 2 tensor back into one host vector per batch row
    fn to_token_rows(&self) -> Result<Vec<Vec<u32>>>;
}

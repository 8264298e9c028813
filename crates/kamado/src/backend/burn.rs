//! The burn implementation for backend provision.
//! Burn tensors carry their rank and kind in the type, so token tensors are
//! `Tensor<B, 2, Int>` for any burn backend `B`.
use super::Backend;
use crate::error::{Error, Result};
use crate::tensor::operations::{pad_rows, token_batch_size, token_id, unflatten_rows};
use burn::tensor::backend::Backend as BurnBackend;
use burn::tensor::{Int, Tensor, TensorData};

impl<B> Backend for Tensor<B, 2, Int>
where B: BurnBackend
{
    type Device = B::Device;

    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn device(&self) -> Self::Device {
        Tensor::device(self)
    }

    fn to_device(&self, device: &Self::Device) -> Result<Self> {
        Ok(Tensor::to_device(self.clone(), device))
    }

    fn from_token_rows(rows: &[Vec<u32>], pad_token_id: u32, device: &Self::Device) -> Result<Self> {
        let (flat, width) = pad_rows(rows, pad_token_id);
        let flat: Vec<i64> = flat.into_iter().map(i64::from).collect();
        let data = TensorData::new(flat, [rows.len(), width]);
        Ok(Tensor::<B, 2, Int>::from_data(data, device))
    }

    fn to_token_rows(&self) -> Result<Vec<Vec<u32>>> {
        let batch = token_batch_size(&self.dims())?;
        let values = self
            .to_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| Error::Decode(format!("{:?}", e)))?;
        let ids = values.into_iter().map(token_id).collect::<Result<Vec<u32>>>()?;
        Ok(unflatten_rows(&ids, batch))
    }
}

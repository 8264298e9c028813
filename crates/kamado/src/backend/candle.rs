use super::Backend;
use crate::error::Result;
use crate::tensor::operations::{pad_rows, token_batch_size, token_id};
use candle_core::{DType, Device, Tensor};

impl Backend for Tensor {
    type Device = Device;

    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn device(&self) -> Self::Device {
        Tensor::device(self).clone()
    }

    fn to_device(&self, device: &Self::Device) -> Result<Self> {
        if Tensor::device(self).same_device(device) {
            return Ok(self.clone());
        }
        Ok(Tensor::to_device(self, device)?)
    }

    fn from_token_rows(rows: &[Vec<u32>], pad_token_id: u32, device: &Self::Device) -> Result<Self> {
        let (flat, width) = pad_rows(rows, pad_token_id);
        Ok(Tensor::from_vec(flat, (rows.len(), width), device)?)
    }

    fn to_token_rows(&self) -> Result<Vec<Vec<u32>>> {
        token_batch_size(self.dims())?;
        self.to_dtype(DType::I64)?
            .to_vec2::<i64>()?
            .into_iter()
            .map(|row| row.into_iter().map(token_id).collect::<Result<Vec<u32>>>())
            .collect()
    }
}

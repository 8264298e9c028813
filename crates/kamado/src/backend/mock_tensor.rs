use crate::backend::Backend;
use crate::error::Result;
use crate::tensor::operations::{pad_rows, token_batch_size, unflatten_rows};

/// Devices a [`MockTensor`] can be placed on
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MockDevice {
    #[default]
    Cpu,
    Accelerator,
}

// A simple mock tensor implementation for testing
#[derive(Clone, Debug, PartialEq)]
pub struct MockTensor {
    pub(crate) shape: Vec<usize>,
    pub(crate) values: Vec<u32>,
    pub(crate) device: MockDevice,
}

impl MockTensor {
    pub fn new(shape: Vec<usize>, values: Vec<u32>) -> Self {
        Self { shape, values, device: MockDevice::Cpu }
    }

    /// A `(batch, seq)` tensor filled with `value`
    pub fn filled(batch: usize, seq: usize, value: u32) -> Self {
        Self::new(vec![batch, seq], vec![value; batch * seq])
    }
}

impl Backend for MockTensor {
    type Device = MockDevice;

    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    fn device(&self) -> Self::Device {
        self.device.clone()
    }

    fn to_device(&self, device: &Self::Device) -> Result<Self> {
        Ok(Self { device: device.clone(), ..self.clone() })
    }

    fn from_token_rows(rows: &[Vec<u32>], pad_token_id: u32, device: &Self::Device) -> Result<Self> {
        let (values, width) = pad_rows(rows, pad_token_id);
        Ok(Self { shape: vec![rows.len(), width], values, device: device.clone() })
    }

    fn to_token_rows(&self) -> Result<Vec<Vec<u32>>> {
        let batch = token_batch_size(&self.shape)?;
        Ok(unflatten_rows(&self.values, batch))
    }
}

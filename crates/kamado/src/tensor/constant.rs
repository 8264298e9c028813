/// # Constants with reserved meanings in Kamado

/// In a given tensor shape, Kamado reserves the `0th` dimension for batching
pub const BATCH_DIM: usize = 0;

/// In a given tensor shape, Kamado reserves the `1st` dimension for sequence
pub const SEQ_DIM: usize = 1;

/// Token tensors handed to and returned from generation are `(batch, seq)`
pub const TOKEN_RANK: usize = 2;

//! Concrete [`GenerationCapability`](crate::generation::GenerationCapability) backends.

#[cfg_attr(docsrs, doc(cfg(feature = "t5")))]
pub mod t5;

//! Descriptor aggregation — wire codec and per-prefix descriptor sets.

pub mod set;
pub mod wire;

pub use set::DescriptorSet;
pub use wire::FileEntry;

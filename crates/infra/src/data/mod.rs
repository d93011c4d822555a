//! Batch loading of raw float64 series

pub mod load;

pub use load::BatchLoader;

pub mod core;
pub mod error;
pub mod prelude;
pub mod utils;

// Re-export types
pub use crate::core::{Dense, Layer, LeakyReLU, ReLU, Sigmoid, SoftMax, Tanh};
pub use crate::error::{NNError, Result};

// src/core.rs
pub mod activations;
pub mod layers;

// Re-export commonly used items
pub use activations::{LeakyReLU, ReLU, Sigmoid, SoftMax, Tanh};
pub use layers::{Dense, Layer, LayerCache, ParamGrads};

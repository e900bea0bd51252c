use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum NNError {
    // Layer construction errors
    InvalidLayerConfiguration(String),

    // Shape errors
    IncompatibleShape(String),

    // Lifecycle errors
    LayerNotBuilt,

    // Missing polymorphic implementation
    Unimplemented(String),
}

impl fmt::Display for NNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NNError::InvalidLayerConfiguration(msg) => {
                write!(f, "Invalid layer configuration: {}", msg)
            }
            NNError::IncompatibleShape(msg) => write!(f, "Incompatible shape: {}", msg),
            NNError::LayerNotBuilt => {
                write!(f, "Layer not built. Call forward() before backprop()")
            }
            NNError::Unimplemented(msg) => write!(f, "Not implemented: {}", msg),
        }
    }
}

impl Error for NNError {}

pub type Result<T> = std::result::Result<T, NNError>;

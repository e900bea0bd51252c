pub use serde::{Deserialize, Serialize};
pub use std::collections::HashMap;

pub use ndarray::*;
pub use ndarray_rand::rand_distr::Uniform;
pub use ndarray_rand::RandomExt;
pub use rand::rngs::StdRng;
pub use rand::SeedableRng;

pub use crate::error::*;

// Internal re-exports
pub use crate::core::{
    Dense,
    Layer,
    LayerCache,
    LeakyReLU,
    ParamGrads,
    ReLU,
    Sigmoid,
    SoftMax,
    Tanh,
};
pub use crate::utils::{maximum, maximum_vec, outer};

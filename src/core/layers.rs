use crate::prelude::*;
use crate::utils::outer;

/// Named gradients (or parameters) keyed by name, e.g. "weights", "biases".
pub type ParamGrads = HashMap<String, ArrayD<f64>>;

/// Per-layer input/output cache, overwritten on every forward call.
///
/// The layer exclusively owns both vectors; anything handed back to the
/// caller is an independent copy, never an alias into this cache.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LayerCache {
    pub input: Option<Array1<f64>>,
    pub output: Option<Array1<f64>>,
}

pub trait Layer {
    /// The layer's forward transform, without any caching or building.
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>>;

    /// Fixes shapes and (where applicable) initializes parameters.
    /// Invoked by `forward` exactly once, on the first call.
    fn build_parameters(&mut self, neurons: &Array1<f64>) -> Result<()>;

    /// Given the upstream gradient, returns the gradients of the trainable
    /// parameters (possibly empty) and the gradient to pass to the
    /// preceding layer.
    fn backprop(&self, gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)>;

    fn cache(&self) -> &LayerCache;
    fn cache_mut(&mut self) -> &mut LayerCache;

    fn built(&self) -> bool;
    fn input_shape(&self) -> Option<usize>;
    fn output_shape(&self) -> Option<usize>;
    fn n_param(&self) -> usize;
    fn typ(&self) -> String;

    /// Stores the input, builds parameters on the first call, computes and
    /// caches the output, and returns an independent copy of it.
    fn forward(&mut self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        self.cache_mut().input = Some(neurons.clone());
        if !self.built() {
            self.build_parameters(neurons)?;
        }
        let output = self.get_output(neurons)?;
        self.cache_mut().output = Some(output.clone());
        Ok(output)
    }

    fn trainable(&self) -> ParamGrads {
        ParamGrads::new()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum DenseState {
    Uninitialized,
    Built {
        weights: Array2<f64>,
        biases: Array1<f64>,
        input_shape: usize,
    },
}

/// Fully-connected layer: `output = weights . input + biases`.
///
/// The input width, and with it the parameters, are fixed lazily by the
/// first forward call. Weights are drawn uniformly from `[-0.5, 0.5)`,
/// biases start at zero.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Dense {
    output_shape: usize,
    seed: Option<u64>,
    state: DenseState,
    cache: LayerCache,
}

impl Dense {
    pub fn new(output_shape: usize) -> Result<Self> {
        Self::with_rng(output_shape, None)
    }

    /// Deterministic variant of `new`; identical seeds give identical
    /// initial weights.
    pub fn with_seed(output_shape: usize, seed: u64) -> Result<Self> {
        Self::with_rng(output_shape, Some(seed))
    }

    fn with_rng(output_shape: usize, seed: Option<u64>) -> Result<Self> {
        if output_shape == 0 {
            return Err(NNError::InvalidLayerConfiguration(
                "Layer dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            output_shape,
            seed,
            state: DenseState::Uninitialized,
            cache: LayerCache::default(),
        })
    }

    /// Builds a layer directly from explicit parameters, skipping the lazy
    /// random initialization.
    pub fn from_parameters(weights: Array2<f64>, biases: Array1<f64>) -> Result<Self> {
        let (output_shape, input_shape) = weights.dim();
        if output_shape == 0 || input_shape == 0 {
            return Err(NNError::InvalidLayerConfiguration(
                "Layer dimensions must be greater than 0".to_string(),
            ));
        }
        if biases.len() != output_shape {
            return Err(NNError::IncompatibleShape(format!(
                "biases length {} does not match weight rows {}",
                biases.len(),
                output_shape
            )));
        }
        Ok(Self {
            output_shape,
            seed: None,
            state: DenseState::Built {
                weights,
                biases,
                input_shape,
            },
            cache: LayerCache::default(),
        })
    }

    pub fn weights(&self) -> Option<&Array2<f64>> {
        match &self.state {
            DenseState::Built { weights, .. } => Some(weights),
            DenseState::Uninitialized => None,
        }
    }

    pub fn biases(&self) -> Option<&Array1<f64>> {
        match &self.state {
            DenseState::Built { biases, .. } => Some(biases),
            DenseState::Uninitialized => None,
        }
    }
}

impl Layer for Dense {
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        match &self.state {
            DenseState::Built {
                weights,
                biases,
                input_shape,
            } => {
                if neurons.len() != *input_shape {
                    return Err(NNError::IncompatibleShape(format!(
                        "expected input of length {}, got {}",
                        input_shape,
                        neurons.len()
                    )));
                }
                Ok(weights.dot(neurons) + biases)
            }
            DenseState::Uninitialized => Err(NNError::LayerNotBuilt),
        }
    }

    fn build_parameters(&mut self, neurons: &Array1<f64>) -> Result<()> {
        if self.built() {
            return Ok(());
        }
        let input_shape = neurons.len();
        if input_shape == 0 {
            return Err(NNError::IncompatibleShape(
                "expected a non-empty input vector".to_string(),
            ));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let weights = Array2::random_using(
            (self.output_shape, input_shape),
            Uniform::new(-0.5, 0.5),
            &mut rng,
        );
        let biases = Array1::zeros(self.output_shape);

        self.state = DenseState::Built {
            weights,
            biases,
            input_shape,
        };
        Ok(())
    }

    fn backprop(&self, gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)> {
        let weights = match &self.state {
            DenseState::Built { weights, .. } => weights,
            DenseState::Uninitialized => return Err(NNError::LayerNotBuilt),
        };
        let input = self.cache.input.as_ref().ok_or(NNError::LayerNotBuilt)?;
        if gradients.len() != self.output_shape {
            return Err(NNError::IncompatibleShape(format!(
                "expected gradient of length {}, got {}",
                self.output_shape,
                gradients.len()
            )));
        }

        // trainable parameters
        let nabla_w = outer(gradients, input);
        let nabla_b = gradients.clone();

        // gradient passing on backprop
        let nabla_a = gradients.dot(weights);

        let mut trainable = ParamGrads::new();
        trainable.insert("weights".to_string(), nabla_w.into_dyn());
        trainable.insert("biases".to_string(), nabla_b.into_dyn());
        Ok((trainable, nabla_a))
    }

    fn cache(&self) -> &LayerCache {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut LayerCache {
        &mut self.cache
    }

    fn built(&self) -> bool {
        matches!(self.state, DenseState::Built { .. })
    }

    fn input_shape(&self) -> Option<usize> {
        match &self.state {
            DenseState::Built { input_shape, .. } => Some(*input_shape),
            DenseState::Uninitialized => None,
        }
    }

    fn output_shape(&self) -> Option<usize> {
        Some(self.output_shape)
    }

    fn n_param(&self) -> usize {
        match &self.state {
            DenseState::Built { input_shape, .. } => {
                self.output_shape * input_shape + self.output_shape
            }
            DenseState::Uninitialized => 0,
        }
    }

    fn typ(&self) -> String {
        "Dense".into()
    }
}

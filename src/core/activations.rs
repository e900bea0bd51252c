use crate::prelude::*;
use crate::utils::{maximum, maximum_vec, outer};

/// Shared state for elementwise activations: the shape fixed by the first
/// forward call and the input/output cache. Activations own no trainable
/// parameters, so `input_shape == output_shape` always.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ActivationBase {
    shape: Option<usize>,
    cache: LayerCache,
}

impl ActivationBase {
    fn build(&mut self, neurons: &Array1<f64>) {
        self.shape = Some(neurons.len());
    }

    fn output(&self) -> Result<&Array1<f64>> {
        self.cache.output.as_ref().ok_or(NNError::LayerNotBuilt)
    }

    fn check_input(&self, neurons: &Array1<f64>) -> Result<()> {
        if let Some(shape) = self.shape {
            if neurons.len() != shape {
                return Err(NNError::IncompatibleShape(format!(
                    "expected input of length {}, got {}",
                    shape,
                    neurons.len()
                )));
            }
        }
        Ok(())
    }

    fn output_for(&self, gradients: &Array1<f64>) -> Result<&Array1<f64>> {
        let output = self.output()?;
        if gradients.len() != output.len() {
            return Err(NNError::IncompatibleShape(format!(
                "expected gradient of length {}, got {}",
                output.len(),
                gradients.len()
            )));
        }
        Ok(output)
    }
}

macro_rules! activation_boilerplate {
    ($name:literal) => {
        fn build_parameters(&mut self, neurons: &Array1<f64>) -> Result<()> {
            self.base.build(neurons);
            Ok(())
        }

        fn cache(&self) -> &LayerCache {
            &self.base.cache
        }

        fn cache_mut(&mut self) -> &mut LayerCache {
            &mut self.base.cache
        }

        fn built(&self) -> bool {
            self.base.shape.is_some()
        }

        fn input_shape(&self) -> Option<usize> {
            self.base.shape
        }

        fn output_shape(&self) -> Option<usize> {
            self.base.shape
        }

        fn n_param(&self) -> usize {
            0
        }

        fn typ(&self) -> String {
            $name.into()
        }
    };
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ReLU {
    base: ActivationBase,
}

impl ReLU {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for ReLU {
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        self.base.check_input(neurons)?;
        Ok(maximum(neurons, 0.0))
    }

    // Branches on the sign of the upstream gradient rather than the cached
    // forward input, and returns the indicator without the chain-rule
    // product. Kept as-is; see DESIGN.md.
    fn backprop(&self, gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)> {
        let grad = gradients.mapv(|g| if g >= 0.0 { 1.0 } else { 0.0 });
        Ok((ParamGrads::new(), grad))
    }

    activation_boilerplate!("ReLU");
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LeakyReLU {
    leak: f64,
    base: ActivationBase,
}

impl LeakyReLU {
    pub fn new(leak: f64) -> Self {
        Self {
            leak,
            base: ActivationBase::default(),
        }
    }

    pub fn leak(&self) -> f64 {
        self.leak
    }
}

impl Default for LeakyReLU {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl Layer for LeakyReLU {
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        self.base.check_input(neurons)?;
        maximum_vec(&(neurons * self.leak), neurons)
    }

    // Same gradient-vs-input confusion as ReLU: the local slope is chosen
    // from the upstream gradient's sign. Kept as-is; see DESIGN.md.
    fn backprop(&self, gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)> {
        let slope = gradients.mapv(|g| if g > 0.0 { 1.0 } else { self.leak });
        Ok((ParamGrads::new(), slope * gradients))
    }

    activation_boilerplate!("LeakyReLU");
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SoftMax {
    base: ActivationBase,
}

impl SoftMax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jacobian of the softmax at the cached output:
    /// `diag(output) - outer(output, output)`.
    pub fn jacobian(&self) -> Result<Array2<f64>> {
        let output = self.base.output()?;
        Ok(Array2::from_diag(output) - outer(output, output))
    }
}

impl Layer for SoftMax {
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        self.base.check_input(neurons)?;
        // subtract the max for numerical stability
        let max = neurons.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let exp = neurons.mapv(|v| (v - max).exp());
        let sum = exp.sum();
        Ok(exp / sum)
    }

    /// Always fails: the softmax gradient is only available as the full
    /// Jacobian, via [`SoftMax::jacobian`]. See DESIGN.md.
    fn backprop(&self, _gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)> {
        Err(NNError::Unimplemented(
            "SoftMax::backprop; use SoftMax::jacobian() instead".to_string(),
        ))
    }

    activation_boilerplate!("SoftMax");
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Sigmoid {
    base: ActivationBase,
}

impl Sigmoid {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for Sigmoid {
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        self.base.check_input(neurons)?;
        Ok(neurons.mapv(|v| 1.0 / (1.0 + (-v).exp())))
    }

    fn backprop(&self, gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)> {
        let output = self.base.output_for(gradients)?;
        let grad = output * &(1.0 - output);
        Ok((ParamGrads::new(), gradients * &grad))
    }

    activation_boilerplate!("Sigmoid");
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Tanh {
    base: ActivationBase,
}

impl Tanh {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for Tanh {
    fn get_output(&self, neurons: &Array1<f64>) -> Result<Array1<f64>> {
        self.base.check_input(neurons)?;
        Ok(neurons.mapv(f64::tanh))
    }

    fn backprop(&self, gradients: &Array1<f64>) -> Result<(ParamGrads, Array1<f64>)> {
        let output = self.base.output_for(gradients)?;
        let grad = output.mapv(|o| 1.0 - o * o);
        Ok((ParamGrads::new(), gradients * &grad))
    }

    activation_boilerplate!("Tanh");
}

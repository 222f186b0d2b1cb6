use log::{trace, warn};
use rand::Rng;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::ops;

/// Where a layer is within one training step.
///
/// `Idle -> Forwarded -> BackPropagated -> Committed`. A layer reports
/// `Committed` until its next forward call, so a repeated commit fails with
/// that state; the next forward call closes the step and moves any state to
/// `Forwarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Idle,
    Forwarded,
    BackPropagated,
    Committed,
}

/// Values cached by the most recent forward call.
#[derive(Debug, Clone)]
struct ForwardCache {
    input: Matrix,
    activated_input: Matrix,
    output: Matrix,
}

/// Candidate weight for the previous layer, computed during back-propagation
/// and held until [`Layer::commit`] writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpdate {
    weight: Matrix,
}

impl StagedUpdate {
    pub fn weight(&self) -> &Matrix {
        &self.weight
    }
}

/// A dense layer with a sigmoid applied at its entry.
///
/// The layer activates the matrix it receives, multiplies by its weight and
/// adds its bias. The output is passed on un-activated; the next layer
/// applies the sigmoid when it receives it.
///
/// During back-propagation a layer computes the update for the layer
/// *behind* it: the bias of that layer is written immediately, the weight is
/// staged and only written by [`Layer::commit`].
#[derive(Debug, Clone)]
pub struct Layer {
    weight: Matrix,
    bias: Matrix,
    eta: f64,
    cache: Option<ForwardCache>,
    delta: Option<Matrix>,
    staged: Option<StagedUpdate>,
    state: LayerState,
}

impl Layer {
    /// Weights are drawn uniformly from (-1, 1) using `rng`; biases start at 1.
    pub fn new<R: Rng>(
        num_inputs: usize,
        num_outputs: usize,
        eta: f64,
        rng: &mut R,
    ) -> Result<Layer> {
        if num_inputs == 0 || num_outputs == 0 {
            return Err(NnError::InvalidConstruction(format!(
                "layer needs at least one input and one output, got {num_inputs} -> {num_outputs}"
            )));
        }
        check_eta(eta)?;

        let weight = Matrix::random(num_inputs, num_outputs, rng)?;
        let bias = Matrix::filled(1, num_outputs, 1.0)?;

        Ok(Layer::assemble(weight, bias, eta))
    }

    /// Builds a layer from known parameters instead of a random draw.
    pub fn with_parameters(weight: Matrix, bias: Matrix, eta: f64) -> Result<Layer> {
        check_eta(eta)?;
        if bias.rows() != 1 || bias.cols() != weight.cols() {
            return Err(NnError::InvalidConstruction(format!(
                "bias must be 1x{}, got {}x{}",
                weight.cols(),
                bias.rows(),
                bias.cols()
            )));
        }

        Ok(Layer::assemble(weight, bias, eta))
    }

    fn assemble(weight: Matrix, bias: Matrix, eta: f64) -> Layer {
        Layer {
            weight,
            bias,
            eta,
            cache: None,
            delta: None,
            staged: None,
            state: LayerState::Idle,
        }
    }

    /// Replaces weight and bias in place. Shapes must match the current ones.
    pub fn set_parameters(&mut self, weight: Matrix, bias: Matrix) -> Result<()> {
        if weight.shape() != self.weight.shape() {
            return Err(NnError::shape("set_parameters", self.weight.shape(), weight.shape()));
        }
        if bias.shape() != self.bias.shape() {
            return Err(NnError::shape("set_parameters", self.bias.shape(), bias.shape()));
        }

        self.weight = weight;
        self.bias = bias;
        Ok(())
    }

    /// Runs `input` through this layer and returns `sigmoid(input) * W + b`.
    ///
    /// Overwrites the cached input, activation and output, and drops any
    /// delta or staged update left from the previous pass. On a width
    /// mismatch nothing is touched.
    pub fn feed_forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.cols() != self.num_inputs() {
            return Err(NnError::shape("feed_forward", input.shape(), self.weight.shape()));
        }

        let activated_input = ops::sigmoid(input);
        let output = ops::add_bias(&ops::multiply(&activated_input, &self.weight)?, &self.bias)?;

        if self.staged.is_some() {
            warn!("forward pass discards an uncommitted staged update");
        }
        trace!(
            "feed_forward {}x{} -> {}x{}",
            input.rows(),
            input.cols(),
            output.rows(),
            output.cols()
        );

        self.cache = Some(ForwardCache {
            input: input.clone(),
            activated_input,
            output: output.clone(),
        });
        self.delta = None;
        self.staged = None;
        self.state = LayerState::Forwarded;

        Ok(output)
    }

    /// Back-propagates using the delta already computed by `next`.
    pub fn back_propagate(&mut self, prev: &mut Layer, next: &Layer) -> Result<()> {
        let next_delta = next.delta.as_ref().ok_or(NnError::InvalidStateTransition {
            op: "back_propagate from a layer without delta",
            state: next.state,
        })?;

        self.back_propagate_from(prev, next_delta)
    }

    /// Back-propagates an externally supplied delta, as the output layer does
    /// with the loss gradient.
    ///
    /// Computes this layer's delta, stages the new weight of `prev` and
    /// subtracts `eta * delta` from the bias of `prev` right away. The bias
    /// is a single row, so a delta of several rows is a shape mismatch.
    /// `prev` must have produced the input this layer was last fed. If any
    /// check fails, neither layer is modified.
    pub fn back_propagate_from(&mut self, prev: &mut Layer, next_delta: &Matrix) -> Result<()> {
        let cache = match (&self.cache, self.state) {
            (Some(cache), LayerState::Forwarded) => cache,
            _ => {
                return Err(NnError::InvalidStateTransition {
                    op: "back_propagate",
                    state: self.state,
                })
            }
        };
        let prev_input = prev.input().ok_or(NnError::InvalidStateTransition {
            op: "back_propagate into an unforwarded layer",
            state: prev.state,
        })?;
        if prev.output() != Some(&cache.input) {
            return Err(NnError::InvalidStateTransition {
                op: "back_propagate into a layer forwarded in another pass",
                state: prev.state,
            });
        }

        let error = ops::multiply(next_delta, &ops::transpose(&self.weight))?;
        let delta = ops::elementwise_multiply(&error, &ops::sigmoid_derivative(&cache.input))?;
        let gradient = ops::multiply(&ops::transpose(prev_input), &delta)?;

        let candidate = ops::subtract(&prev.weight, &ops::scale(&gradient, self.eta))?;
        let bias = ops::subtract(&prev.bias, &ops::scale(&delta, self.eta))?;

        trace!(
            "back_propagate delta {}x{}, staged weight {}x{}",
            delta.rows(),
            delta.cols(),
            candidate.rows(),
            candidate.cols()
        );

        prev.bias = bias;
        self.delta = Some(delta);
        self.staged = Some(StagedUpdate { weight: candidate });
        self.state = LayerState::BackPropagated;

        Ok(())
    }

    /// Writes the staged weight into `prev`. Fails if nothing is staged,
    /// including a second commit for the same back-propagation.
    pub fn commit(&mut self, prev: &mut Layer) -> Result<()> {
        let staged = self.staged.as_ref().ok_or(NnError::InvalidStateTransition {
            op: "commit",
            state: self.state,
        })?;
        if staged.weight.shape() != prev.weight.shape() {
            return Err(NnError::shape("commit", prev.weight.shape(), staged.weight.shape()));
        }

        if let Some(staged) = self.staged.take() {
            prev.weight = staged.weight;
        }
        self.state = LayerState::Committed;
        trace!("commit weight {}x{}", prev.weight.rows(), prev.weight.cols());

        Ok(())
    }

    pub fn num_inputs(&self) -> usize {
        self.weight.rows()
    }

    pub fn num_outputs(&self) -> usize {
        self.weight.cols()
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn weight(&self) -> &Matrix {
        &self.weight
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn staged(&self) -> Option<&StagedUpdate> {
        self.staged.as_ref()
    }

    /// Last matrix fed to this layer.
    pub fn input(&self) -> Option<&Matrix> {
        self.cache.as_ref().map(|c| &c.input)
    }

    /// Sigmoid of the last input.
    pub fn activated_input(&self) -> Option<&Matrix> {
        self.cache.as_ref().map(|c| &c.activated_input)
    }

    /// Last raw output, bias included.
    pub fn output(&self) -> Option<&Matrix> {
        self.cache.as_ref().map(|c| &c.output)
    }

    pub fn delta(&self) -> Option<&Matrix> {
        self.delta.as_ref()
    }
}

fn check_eta(eta: f64) -> Result<()> {
    if !(eta.is_finite() && eta > 0.0) {
        return Err(NnError::InvalidConstruction(format!(
            "learning rate must be positive, got {eta}"
        )));
    }
    Ok(())
}

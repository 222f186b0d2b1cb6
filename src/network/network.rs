use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::spec::NetworkSpec;

/// An ordered chain of layers, index 0 closest to the raw input.
///
/// One training pass is `forward`, then `backward`, then `commit`. Layer `i`
/// stages the weight update of layer `i - 1`, so the output layer's own
/// weight is never updated and layer 0 never runs backward.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Chains `layers`, checking that each one accepts its predecessor's width.
    pub fn new(layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::InvalidConstruction("network has no layers".into()));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].num_outputs() != pair[1].num_inputs() {
                return Err(NnError::InvalidConstruction(format!(
                    "layer {} outputs {} but layer {} expects {}",
                    i,
                    pair[0].num_outputs(),
                    i + 1,
                    pair[1].num_inputs()
                )));
            }
        }
        Ok(Network { layers })
    }

    /// Builds a randomly initialised network; seeded when `spec.seed` is set.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Network> {
        spec.validate()?;
        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let layers = spec
            .layers
            .iter()
            .map(|l| Layer::new(l.inputs, l.outputs, spec.eta, &mut rng))
            .collect::<Result<Vec<_>>>()?;

        debug!("built network with {} layers", layers.len());
        Network::new(layers)
    }

    /// Forward pass; each layer's output becomes the next layer's input.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.feed_forward(&current)?;
        }
        Ok(current)
    }

    /// Stages updates from the output layer down to layer 1.
    ///
    /// `output_delta` stands in for the delta after the output layer.
    pub fn backward(&mut self, output_delta: &Matrix) -> Result<()> {
        for i in (1..self.layers.len()).rev() {
            let (head, tail) = self.layers.split_at_mut(i);
            let prev = &mut head[i - 1];
            let Some((current, rest)) = tail.split_first_mut() else {
                continue;
            };

            match rest.first() {
                Some(next) => current.back_propagate(prev, next)?,
                None => current.back_propagate_from(prev, output_delta)?,
            }
        }
        if self.layers.len() > 1 {
            debug!("backward staged {} updates", self.layers.len() - 1);
        }
        Ok(())
    }

    /// Writes every staged weight, in the same order they were staged.
    pub fn commit(&mut self) -> Result<()> {
        for i in (1..self.layers.len()).rev() {
            let (head, tail) = self.layers.split_at_mut(i);
            let prev = &mut head[i - 1];
            if let Some(current) = tail.first_mut() {
                current.commit(prev)?;
            }
        }
        Ok(())
    }

    /// Overwrites one layer's parameters, keeping their shapes.
    pub fn set_parameters(&mut self, index: usize, weight: Matrix, bias: Matrix) -> Result<()> {
        let len = self.layers.len();
        let layer = self.layers.get_mut(index).ok_or_else(|| {
            NnError::InvalidConstruction(format!("no layer {index} in a network of {len}"))
        })?;
        layer.set_parameters(weight, bias)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::dense::LayerState;

    fn m(data: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_data(data).unwrap()
    }

    fn seeded(widths: &[usize]) -> Network {
        Network::from_spec(&NetworkSpec::from_topology(widths, 0.1, Some(17)).unwrap()).unwrap()
    }

    #[test]
    fn new_rejects_empty_and_disconnected_chains() {
        assert!(Network::new(vec![]).unwrap_err().is_invalid_construction());

        let a = Layer::with_parameters(Matrix::zeros(2, 3).unwrap(), Matrix::zeros(1, 3).unwrap(), 0.1).unwrap();
        let b = Layer::with_parameters(Matrix::zeros(2, 1).unwrap(), Matrix::zeros(1, 1).unwrap(), 0.1).unwrap();
        assert!(Network::new(vec![a, b]).unwrap_err().is_invalid_construction());
    }

    #[test]
    fn same_seed_gives_same_network() {
        let a = seeded(&[3, 4, 2]);
        let b = seeded(&[3, 4, 2]);
        for (la, lb) in a.layers().iter().zip(b.layers()) {
            assert_eq!(la.weight(), lb.weight());
        }
    }

    #[test]
    fn forward_pipes_outputs() {
        let mut net = seeded(&[3, 4, 2]);
        let out = net.forward(&m(vec![vec![0.1, 0.2, 0.3], vec![1.0, 0.0, -1.0]])).unwrap();
        assert_eq!(out.shape(), (2, 2));
        assert_eq!(net.layer(1).unwrap().input(), net.layer(0).unwrap().output());
    }

    #[test]
    fn backward_before_forward_is_rejected() {
        let mut net = seeded(&[2, 2, 1]);
        let err = net.backward(&m(vec![vec![0.1]])).unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn commit_before_backward_is_rejected() {
        let mut net = seeded(&[2, 2, 1]);
        net.forward(&m(vec![vec![1.0, 1.0]])).unwrap();
        assert!(net.commit().unwrap_err().is_invalid_state());
    }

    #[test]
    fn full_pass_moves_states_and_leaves_output_weight() {
        let mut net = seeded(&[2, 3, 2, 1]);
        let output_weight = net.layer(2).unwrap().weight().clone();

        net.forward(&m(vec![vec![1.0, 0.5]])).unwrap();
        net.backward(&m(vec![vec![0.3]])).unwrap();
        assert_eq!(net.layer(0).unwrap().state(), LayerState::Forwarded);
        assert_eq!(net.layer(1).unwrap().state(), LayerState::BackPropagated);
        assert_eq!(net.layer(2).unwrap().state(), LayerState::BackPropagated);

        net.commit().unwrap();
        assert_eq!(net.layer(1).unwrap().state(), LayerState::Committed);
        assert_eq!(net.layer(2).unwrap().weight(), &output_weight);
    }

    #[test]
    fn single_layer_network_has_nothing_to_stage() {
        let mut net = seeded(&[2, 1]);
        let before = net.layer(0).unwrap().weight().clone();
        net.forward(&m(vec![vec![1.0, 1.0]])).unwrap();
        net.backward(&m(vec![vec![0.5]])).unwrap();
        net.commit().unwrap();
        assert_eq!(net.layer(0).unwrap().weight(), &before);
    }

    #[test]
    fn wrong_output_delta_width_is_shape_mismatch() {
        let mut net = seeded(&[2, 2, 1]);
        net.forward(&m(vec![vec![1.0, 1.0]])).unwrap();
        assert!(net.backward(&m(vec![vec![0.1, 0.2]])).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn set_parameters_rejects_unknown_index() {
        let mut net = seeded(&[2, 1]);
        let err = net
            .set_parameters(4, Matrix::zeros(2, 1).unwrap(), Matrix::zeros(1, 1).unwrap())
            .unwrap_err();
        assert!(err.is_invalid_construction());
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NnError, Result};

/// Describes one layer in a network specification.
///
/// - `inputs`  — width of the matrix fed to this layer (the previous layer's
///               `outputs`, or the raw feature count for the first layer)
/// - `outputs` — width of the matrix this layer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub inputs: usize,
    pub outputs: usize,
}

/// A serializable description of a network's topology and hyperparameters.
///
/// Only the architecture is stored here, never trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Ordered list of layers, input side first.
    pub layers: Vec<LayerSpec>,
    /// Learning rate shared by every layer.
    pub eta: f64,
    /// Seed for the initial weight draw; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    /// Builds a spec from layer widths, e.g. `[2, 2, 1]` gives `2->2` and `2->1`.
    pub fn from_topology(widths: &[usize], eta: f64, seed: Option<u64>) -> Result<NetworkSpec> {
        if widths.len() < 2 {
            return Err(NnError::InvalidConstruction(format!(
                "topology needs at least two widths, got {}",
                widths.len()
            )));
        }

        let layers = widths
            .windows(2)
            .map(|w| LayerSpec {
                inputs: w[0],
                outputs: w[1],
            })
            .collect();

        let spec = NetworkSpec { layers, eta, seed };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks sizes, learning rate and that adjacent layers agree on width.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConstruction("network has no layers".into()));
        }
        if !(self.eta.is_finite() && self.eta > 0.0) {
            return Err(NnError::InvalidConstruction(format!(
                "learning rate must be positive, got {}",
                self.eta
            )));
        }
        if let Some((i, _)) = self
            .layers
            .iter()
            .enumerate()
            .find(|(_, l)| l.inputs == 0 || l.outputs == 0)
        {
            return Err(NnError::InvalidConstruction(format!("layer {i} has a zero width")));
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].outputs != pair[1].inputs {
                return Err(NnError::InvalidConstruction(format!(
                    "layer {} outputs {} but layer {} expects {}",
                    i,
                    pair[0].outputs,
                    i + 1,
                    pair[1].inputs
                )));
            }
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a spec from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}

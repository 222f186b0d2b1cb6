use crate::error::{NnError, Result};

/// Configuration for a `train` run.
///
/// # Fields
/// - `epochs`    — total number of passes over the training samples
/// - `log_every` — an `info!` line is emitted every `log_every` epochs and
///                 for the final one; `0` silences progress logging
pub struct TrainConfig {
    pub epochs: usize,
    pub log_every: usize,
}

impl TrainConfig {
    pub fn new(epochs: usize, log_every: usize) -> Self {
        TrainConfig { epochs, log_every }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NnError::InvalidConstruction("epochs must be at least 1".into()));
        }
        Ok(())
    }

    pub(crate) fn should_log(&self, epoch: usize) -> bool {
        self.log_every > 0 && (epoch % self.log_every == 0 || epoch == self.epochs)
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(1000, 100)
    }
}

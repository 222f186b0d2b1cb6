use std::time::Instant;

use log::{debug, info};

use crate::{
    error::{NnError, Result},
    loss::mse::MseLoss,
    math::matrix::Matrix,
    network::network::Network,
    train::{epoch_stats::EpochStats, train_config::TrainConfig},
};

/// One full pass: forward, MSE loss, backward from the loss gradient, commit.
/// Returns the loss measured before the update.
pub fn train_step(network: &mut Network, input: &Matrix, target: &Matrix) -> Result<f64> {
    let output = network.forward(input)?;
    let loss = MseLoss::loss(&output, target)?;

    let delta = MseLoss::derivative(&output, target)?;
    network.backward(&delta)?;
    network.commit()?;

    Ok(loss)
}

/// Runs `config.epochs` epochs over the samples in the given order and
/// returns the statistics of every epoch.
///
/// Each element of `inputs` is one batch (one or more rows) paired with the
/// target at the same index.
pub fn train(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    if inputs.is_empty() {
        return Err(NnError::InvalidConstruction("no training samples".into()));
    }
    if inputs.len() != targets.len() {
        return Err(NnError::InvalidConstruction(format!(
            "{} inputs but {} targets",
            inputs.len(),
            targets.len()
        )));
    }

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let mut total_loss = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            total_loss += train_step(network, input, target)?;
        }
        let loss = total_loss / inputs.len() as f64;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if config.should_log(epoch) {
            info!("epoch {}/{}: loss = {:.6}", epoch, config.epochs, loss);
        } else {
            debug!("epoch {}/{}: loss = {:.6}", epoch, config.epochs, loss);
        }

        history.push(stats);
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::spec::NetworkSpec;

    fn xor() -> (Vec<Matrix>, Vec<Matrix>) {
        let inputs = [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
            .iter()
            .map(|r| Matrix::row_vector(r.to_vec()).unwrap())
            .collect();
        let targets = [1.0, 0.0, 1.0, 0.0]
            .iter()
            .map(|&t| Matrix::row_vector(vec![t]).unwrap())
            .collect();
        (inputs, targets)
    }

    fn network() -> Network {
        Network::from_spec(&NetworkSpec::from_topology(&[2, 3, 1], 0.1, Some(21)).unwrap()).unwrap()
    }

    #[test]
    fn train_step_updates_first_layer() {
        let mut net = network();
        let before = net.layer(0).unwrap().weight().clone();
        let (inputs, targets) = xor();

        let loss = train_step(&mut net, &inputs[0], &targets[0]).unwrap();
        assert!(loss.is_finite() && loss >= 0.0);
        assert_ne!(net.layer(0).unwrap().weight(), &before);
    }

    #[test]
    fn train_reports_every_epoch() {
        let mut net = network();
        let (inputs, targets) = xor();
        let history = train(&mut net, &inputs, &targets, &TrainConfig::new(5, 0)).unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(history[4].epoch, 5);
        assert!(history.iter().all(|s| s.total_epochs == 5 && s.loss.is_finite()));
    }

    #[test]
    fn train_rejects_bad_sample_sets() {
        let mut net = network();
        let (inputs, targets) = xor();
        let config = TrainConfig::new(1, 0);

        assert!(train(&mut net, &[], &[], &config).is_err());
        assert!(train(&mut net, &inputs, &targets[..2], &config).is_err());
        assert!(train(&mut net, &inputs, &targets, &TrainConfig::new(0, 0)).is_err());
    }

    #[test]
    fn log_schedule_includes_last_epoch() {
        let config = TrainConfig::new(25, 10);
        assert!(config.should_log(10));
        assert!(!config.should_log(11));
        assert!(config.should_log(25));
        assert!(!TrainConfig::new(25, 0).should_log(25));
    }
}

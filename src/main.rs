// Trains a small network on XOR and prints its predictions.
//
//   cargo run -- [spec.json]
//
// Without a spec file a seeded 2-3-1 network is used. Set RUST_LOG=info
// (or debug/trace) to follow training progress.
use log::{error, info};

use sigmoid_net::{train, Matrix, Network, NetworkSpec, Result, TrainConfig};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let spec = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading network spec from {path}");
            NetworkSpec::load_json(path)?
        }
        None => NetworkSpec::from_topology(&[2, 3, 1], 0.5, Some(42))?,
    };
    let mut network = Network::from_spec(&spec)?;

    let inputs = [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
        .iter()
        .map(|r| Matrix::row_vector(r.to_vec()))
        .collect::<Result<Vec<_>>>()?;
    let targets = [1.0, 0.0, 1.0, 0.0]
        .iter()
        .map(|&t| Matrix::row_vector(vec![t]))
        .collect::<Result<Vec<_>>>()?;

    let history = train(&mut network, &inputs, &targets, &TrainConfig::new(10_000, 1_000))?;

    for input in &inputs {
        let output = network.forward(input)?;
        println!("Input: {:?} -> Output: {:.4}", input.row(0), output.get(0, 0));
    }
    if let Some(last) = history.last() {
        println!("{}", serde_json::to_string(last)?);
    }

    Ok(())
}

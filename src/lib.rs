pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use layers::dense::{Layer, LayerState, StagedUpdate};
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use loss::mse::MseLoss;
pub use train::trainer::{train, train_step};
pub use train::train_config::TrainConfig;
pub use train::epoch_stats::EpochStats;

pub mod math;
pub mod activation;
pub mod layers;
pub mod model;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;
pub mod observer;
pub mod error;
pub mod logging;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use data::{BatchStream, ImageShape, Sample};
pub use error::{HarnessError, Result};
pub use model::{ConvNet, Model, ModelConfig};
pub use loss::{CrossEntropyLoss, Loss};
pub use optim::{Adam, Optimizer, Sgd};
pub use observer::{snapshot_channel, MetricsObserver};
pub use train::{
    DefaultSession, DriverState, EpochMetrics, EpochRecord, MetricSnapshot, TrainConfig,
    TrainingDriver, TrainingSession,
};

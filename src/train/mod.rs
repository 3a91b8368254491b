pub mod driver;
pub mod epoch;
pub mod epoch_stats;
pub mod history;
pub mod metrics;
pub mod session;
pub mod train_config;

pub use driver::{DriverState, TrainingDriver};
pub use epoch::{run_training_epoch, run_validation_epoch, sample_prediction, SamplePrediction};
pub use epoch_stats::{EpochMetrics, EpochRecord, SampleRecord};
pub use history::{History, MetricSnapshot, SnapshotSeries};
pub use session::{DefaultSession, TrainingSession};
pub use train_config::{OptimizerKind, TrainConfig};

use std::path::{Path, PathBuf};

use log::info;
use serde::{Serialize, Deserialize};

use crate::data::{DataConfig, DEFAULT_PIXEL_DIVISOR};
use crate::error::{HarnessError, Result};
use crate::model::ModelConfig;
use crate::optim::{Adam, Optimizer, Sgd};

/// Config file picked up from the working directory when it exists.
pub const DEFAULT_CONFIG_PATH: &str = "./train_config.json";

/// Which optimizer the session is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

/// Every knob of a training run.
///
/// `Default` reproduces the harness constants (`./data/train.csv`, 100
/// epochs, 2000 validation rows, Adam at 0.01, batches of 16). Any subset of
/// fields can be overridden from JSON; missing fields keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub epochs: usize,
    /// Rows taken from the top of the file for validation.
    pub validation_count: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub optimizer: OptimizerKind,
    /// Root seed; the model and both streams derive their own seeds from it.
    pub seed: u64,
    /// Raw intensities are divided by this before training.
    pub pixel_divisor: f64,
    pub model: ModelConfig,
    /// Address the dashboard binary listens on.
    pub dashboard_addr: String,
    /// Observer refresh period in milliseconds.
    pub refresh_interval_ms: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            data_path: PathBuf::from("./data/train.csv"),
            epochs: 100,
            validation_count: 2000,
            learning_rate: 0.01,
            batch_size: 16,
            optimizer: OptimizerKind::Adam,
            seed: 42,
            pixel_divisor: DEFAULT_PIXEL_DIVISOR,
            model: ModelConfig::default(),
            dashboard_addr: "127.0.0.1:7878".to_owned(),
            refresh_interval_ms: 100,
        }
    }
}

impl TrainConfig {
    /// Loads `./train_config.json` if present, otherwise the defaults, and
    /// validates the result.
    pub fn resolve() -> Result<TrainConfig> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        let config = if path.exists() {
            info!("using configuration from {}", path.display());
            TrainConfig::load_json(path)?
        } else {
            info!("no {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            TrainConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Rejects values that would make the run meaningless before any data is read.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(HarnessError::InvalidArgument("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(HarnessError::InvalidArgument("batch_size must be at least 1".into()));
        }
        if self.validation_count == 0 {
            return Err(HarnessError::InvalidArgument(
                "validation_count must be at least 1 so a sample can be drawn each epoch".into(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(HarnessError::InvalidArgument(format!(
                "learning_rate {} must be a positive number",
                self.learning_rate
            )));
        }
        if !(self.pixel_divisor > 0.0 && self.pixel_divisor.is_finite()) {
            return Err(HarnessError::InvalidArgument(format!(
                "pixel_divisor {} must be a positive number",
                self.pixel_divisor
            )));
        }
        self.model.validate()
    }

    pub fn data_config(&self) -> DataConfig {
        DataConfig {
            validation_count: self.validation_count,
            batch_size: self.batch_size,
            image_shape: self.model.image_shape,
            num_classes: self.model.num_classes,
            pixel_divisor: self.pixel_divisor,
            seed: self.seed,
        }
    }

    /// Seed for weight initialization, distinct from the stream seeds.
    pub fn model_seed(&self) -> u64 {
        self.seed.wrapping_add(2)
    }

    pub fn build_optimizer(&self) -> Box<dyn Optimizer + Send> {
        match self.optimizer {
            OptimizerKind::Sgd => Box::new(Sgd::new(self.learning_rate)),
            OptimizerKind::Adam => Box::new(Adam::new(self.learning_rate)),
        }
    }
}

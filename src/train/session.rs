use log::info;

use crate::data::{self, BatchStream, ImageShape};
use crate::error::Result;
use crate::loss::CrossEntropyLoss;
use crate::model::{ConvNet, Model};
use crate::optim::Optimizer;
use crate::train::train_config::TrainConfig;

/// The session the standard harness builds from a `TrainConfig`.
pub type DefaultSession = TrainingSession<ConvNet, CrossEntropyLoss, Box<dyn Optimizer + Send>>;

/// Everything one training run works on, constructed once at start and
/// owned by the driver for the rest of the process.
pub struct TrainingSession<M, L, O> {
    pub model: M,
    pub loss: L,
    pub optimizer: O,
    pub train: BatchStream,
    pub validation: BatchStream,
    /// Needed to turn the sampled example back into a displayable image.
    pub image_shape: ImageShape,
    pub pixel_divisor: f64,
}

impl<M: Model, L, O> TrainingSession<M, L, O> {
    pub fn new(
        model: M,
        loss: L,
        optimizer: O,
        train: BatchStream,
        validation: BatchStream,
        image_shape: ImageShape,
        pixel_divisor: f64,
    ) -> Self {
        TrainingSession { model, loss, optimizer, train, validation, image_shape, pixel_divisor }
    }
}

impl DefaultSession {
    /// Loads the dataset and builds the model and optimizer named by `config`.
    ///
    /// Every loading or configuration error surfaces here, before any epoch runs.
    pub fn from_config(config: &TrainConfig) -> Result<DefaultSession> {
        config.validate()?;
        let (train, validation) = data::load(&config.data_path, &config.data_config())?;
        let model = ConvNet::new(config.model.clone(), config.model_seed())?;
        info!(
            "model: conv {}@{}x{} -> dense {} -> dense {}; optimizer {:?} lr {}",
            config.model.filters,
            config.model.kernel_size,
            config.model.kernel_size,
            config.model.hidden,
            config.model.num_classes,
            config.optimizer,
            config.learning_rate
        );
        Ok(TrainingSession::new(
            model,
            CrossEntropyLoss,
            config.build_optimizer(),
            train,
            validation,
            config.model.image_shape,
            config.pixel_divisor,
        ))
    }
}

use std::sync::mpsc;
use std::time::Instant;

use log::{info, warn};

use crate::error::{HarnessError, Result};
use crate::loss::Loss;
use crate::model::Model;
use crate::optim::Optimizer;
use crate::train::epoch::{run_training_epoch, run_validation_epoch, sample_prediction};
use crate::train::epoch_stats::{EpochRecord, SampleRecord};
use crate::train::history::{History, MetricSnapshot};
use crate::train::session::TrainingSession;

/// Lifecycle of a driver. There is no pause and no way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Built, no epoch started yet.
    Idle,
    /// Working on (or, after an error, stopped inside) this 1-based epoch.
    Running { epoch: usize },
    /// Every configured epoch completed.
    Finished,
}

/// Runs the outer epoch loop: train, then validate, then sample, then record
/// and publish.
///
/// # Publishing
/// When a publisher is attached, one `MetricSnapshot` is sent at the end of
/// every epoch. If the receiving side has gone away the driver detaches the
/// publisher and keeps training headless.
pub struct TrainingDriver<M, L, O> {
    session: TrainingSession<M, L, O>,
    epochs: usize,
    state: DriverState,
    history: History,
    publisher: Option<mpsc::Sender<MetricSnapshot>>,
}

impl<M, L, O> TrainingDriver<M, L, O>
where
    M: Model,
    L: Loss,
    O: Optimizer,
{
    pub fn new(session: TrainingSession<M, L, O>, epochs: usize) -> Self {
        TrainingDriver {
            session,
            epochs,
            state: DriverState::Idle,
            history: History::new(),
            publisher: None,
        }
    }

    /// Attaches the observer's channel; snapshots flow from the next epoch on.
    pub fn attach(&mut self, publisher: mpsc::Sender<MetricSnapshot>) {
        self.publisher = Some(publisher);
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Runs every configured epoch and returns the final snapshot.
    ///
    /// The first error aborts the whole run; the state is left at the epoch
    /// that failed and the observer keeps the last snapshot it received.
    pub fn run(&mut self) -> Result<MetricSnapshot> {
        if self.state != DriverState::Idle {
            return Err(HarnessError::InvalidArgument(format!(
                "driver cannot start from state {:?}",
                self.state
            )));
        }

        info!(
            "training for {} epochs at learning rate {}",
            self.epochs,
            self.session.optimizer.learning_rate()
        );

        for epoch in 1..=self.epochs {
            self.state = DriverState::Running { epoch };

            let record = self.run_epoch(epoch)?;
            info!(
                "epoch {:>4}/{}  train loss {:.6} acc {:.4}  val loss {:.6} acc {:.4}  sample {}->{}  ({} ms)",
                epoch,
                self.epochs,
                record.train_loss,
                record.train_accuracy,
                record.validation_loss,
                record.validation_accuracy,
                record.sample.label,
                record.sample.prediction,
                record.elapsed_ms
            );
            self.history.push(record);
            self.publish();
        }

        self.state = DriverState::Finished;
        Ok(self.history.snapshot())
    }

    fn run_epoch(&mut self, epoch: usize) -> Result<EpochRecord> {
        let t_start = Instant::now();
        let session = &mut self.session;

        // Validation must see this epoch's fully updated parameters.
        let train = run_training_epoch(
            &mut session.train,
            &mut session.model,
            &session.loss,
            &mut session.optimizer,
        )?;
        let validation = run_validation_epoch(&mut session.validation, &session.model, &session.loss)?;
        let sample = sample_prediction(&mut session.validation, &session.model)?;

        Ok(EpochRecord {
            epoch,
            train_loss: train.loss,
            train_accuracy: train.accuracy,
            validation_loss: validation.loss,
            validation_accuracy: validation.accuracy,
            sample: SampleRecord::from_prediction(&sample, session.image_shape, session.pixel_divisor),
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        })
    }

    fn publish(&mut self) {
        if let Some(tx) = &self.publisher {
            if tx.send(self.history.snapshot()).is_err() {
                warn!("metrics observer went away; continuing without it");
                self.publisher = None;
            }
        }
    }
}

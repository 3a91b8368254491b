//! One pass over a stream: training (with parameter updates) or validation
//! (read-only), plus the random spot-check prediction drawn after each epoch.

use log::debug;

use crate::data::{Batch, BatchStream};
use crate::error::{HarnessError, Result};
use crate::loss::Loss;
use crate::model::Model;
use crate::optim::Optimizer;
use crate::train::epoch_stats::EpochMetrics;
use crate::train::metrics::{argmax, AccuracyMetric, MeanMetric};

/// A single validation example run through the model.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePrediction {
    /// The normalized pixels exactly as the model saw them.
    pub image: Vec<f64>,
    pub label: usize,
    pub prediction: usize,
}

/// Runs one epoch of mini-batch training over `stream`.
///
/// Batches are processed strictly one after another; each gets a forward
/// pass, a loss, a backward pass and exactly one optimizer step. Returns the
/// mean batch loss and the sample accuracy over the whole epoch.
///
/// A batch that does not fit the model aborts the epoch with `ShapeMismatch`.
pub fn run_training_epoch<M, L, O>(
    stream: &mut BatchStream,
    model: &mut M,
    loss_fn: &L,
    optimizer: &mut O,
) -> Result<EpochMetrics>
where
    M: Model + ?Sized,
    L: Loss + ?Sized,
    O: Optimizer + ?Sized,
{
    // Reset the metrics at the start of the epoch.
    let mut mean_loss = MeanMetric::new();
    let mut accuracy = AccuracyMetric::new();

    for (i, batch) in stream.batches().enumerate() {
        check_batch(&batch, &*model)?;

        let predictions = model.forward_train(&batch.images)?;
        let loss = loss_fn.loss(&batch.labels, &predictions);
        let grad = loss_fn.gradient(&batch.labels, &predictions);
        let grads = model.backward(&grad)?;
        optimizer.step(model.parameters_mut(), &grads)?;

        mean_loss.update(loss);
        accuracy.update(&batch.labels, &predictions);

        if (i + 1) % 500 == 0 {
            debug!("batch {}: running loss {:.6}", i + 1, mean_loss.result());
        }
    }

    Ok(EpochMetrics { loss: mean_loss.result(), accuracy: accuracy.result() })
}

/// Runs one read-only epoch over `stream`.
///
/// The model is only borrowed immutably, so no parameter can change here.
pub fn run_validation_epoch<M, L>(
    stream: &mut BatchStream,
    model: &M,
    loss_fn: &L,
) -> Result<EpochMetrics>
where
    M: Model + ?Sized,
    L: Loss + ?Sized,
{
    let mut mean_loss = MeanMetric::new();
    let mut accuracy = AccuracyMetric::new();

    for batch in stream.batches() {
        check_batch(&batch, model)?;

        let predictions = model.predict(&batch.images, false)?;
        mean_loss.update(loss_fn.loss(&batch.labels, &predictions));
        accuracy.update(&batch.labels, &predictions);
    }

    Ok(EpochMetrics { loss: mean_loss.result(), accuracy: accuracy.result() })
}

/// Draws one row uniformly at random from a freshly shuffled view of
/// `stream` and predicts it as a batch of one.
///
/// Only for human inspection; it feeds no metric.
pub fn sample_prediction<M>(stream: &mut BatchStream, model: &M) -> Result<SamplePrediction>
where
    M: Model + ?Sized,
{
    let sample = stream.shuffled().next().cloned().ok_or_else(|| {
        HarnessError::InvalidArgument("cannot sample a prediction from an empty validation set".into())
    })?;

    let batch = Batch::from_samples(std::iter::once(&sample));
    check_batch(&batch, model)?;
    let predictions = model.predict(&batch.images, false)?;

    Ok(SamplePrediction {
        prediction: argmax(predictions.row(0)),
        label: sample.label,
        image: sample.image,
    })
}

fn check_batch<M: Model + ?Sized>(batch: &Batch, model: &M) -> Result<()> {
    if batch.images.cols != model.input_len() {
        return Err(HarnessError::shape_mismatch(
            format!("batch of {}-pixel images", model.input_len()),
            format!("batch of {}-pixel images", batch.images.cols),
        ));
    }
    if let Some(&label) = batch.labels.iter().find(|&&l| l >= model.num_classes()) {
        return Err(HarnessError::shape_mismatch(
            format!("labels below {}", model.num_classes()),
            format!("label {}", label),
        ));
    }
    Ok(())
}

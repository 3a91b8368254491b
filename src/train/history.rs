use std::sync::Arc;

use serde::Serialize;

use crate::train::epoch_stats::{EpochRecord, SampleRecord};

/// Append-only record of every finished epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    records: Vec<EpochRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    /// Freezes a copy of the current history.
    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot(Arc::new(self.clone()))
    }
}

/// Immutable, cheaply clonable view of the history at one point in time.
///
/// This is what crosses the thread boundary to the observer. The default
/// value is the empty snapshot an observer starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSnapshot(Arc<History>);

impl MetricSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> &[EpochRecord] {
        self.0.records()
    }

    /// The most recent epoch, which renderers show in their headline labels.
    pub fn latest(&self) -> Option<&EpochRecord> {
        self.0.last()
    }

    pub fn epochs(&self) -> Vec<usize> {
        self.series(|r| r.epoch)
    }

    pub fn train_accuracy(&self) -> Vec<f64> {
        self.series(|r| r.train_accuracy)
    }

    pub fn train_loss(&self) -> Vec<f64> {
        self.series(|r| r.train_loss)
    }

    pub fn validation_accuracy(&self) -> Vec<f64> {
        self.series(|r| r.validation_accuracy)
    }

    pub fn validation_loss(&self) -> Vec<f64> {
        self.series(|r| r.validation_loss)
    }

    pub fn sample_images(&self) -> Vec<&SampleRecord> {
        self.records().iter().map(|r| &r.sample).collect()
    }

    pub fn sample_labels(&self) -> Vec<usize> {
        self.series(|r| r.sample.label)
    }

    pub fn sample_predictions(&self) -> Vec<usize> {
        self.series(|r| r.sample.prediction)
    }

    /// Column-wise view for serialization: one array per metric.
    pub fn to_series(&self) -> SnapshotSeries {
        SnapshotSeries {
            epoch: self.epochs(),
            train_accuracy: self.train_accuracy(),
            train_loss: self.train_loss(),
            validation_accuracy: self.validation_accuracy(),
            validation_loss: self.validation_loss(),
            sample_label: self.sample_labels(),
            sample_prediction: self.sample_predictions(),
        }
    }

    fn series<T>(&self, f: impl Fn(&EpochRecord) -> T) -> Vec<T> {
        self.records().iter().map(f).collect()
    }
}

/// One ordered sequence per metric, index-aligned by epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSeries {
    pub epoch: Vec<usize>,
    pub train_accuracy: Vec<f64>,
    pub train_loss: Vec<f64>,
    pub validation_accuracy: Vec<f64>,
    pub validation_loss: Vec<f64>,
    pub sample_label: Vec<usize>,
    pub sample_prediction: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: usize) -> EpochRecord {
        EpochRecord {
            epoch,
            train_loss: 1.0 / epoch as f64,
            train_accuracy: 0.5,
            validation_loss: 2.0 / epoch as f64,
            validation_accuracy: 0.25,
            sample: SampleRecord { width: 1, height: 1, pixels: vec![0], label: 1, prediction: epoch % 10 },
            elapsed_ms: 0,
        }
    }

    #[test]
    fn snapshot_is_frozen_at_creation() {
        let mut history = History::new();
        history.push(record(1));
        let snap = history.snapshot();
        history.push(record(2));
        assert_eq!(snap.epochs(), vec![1]);
        assert_eq!(history.snapshot().epochs(), vec![1, 2]);
    }

    #[test]
    fn empty_snapshot_has_empty_series() {
        let snap = MetricSnapshot::default();
        assert!(snap.latest().is_none());
        let json = serde_json::to_string(&snap.to_series()).unwrap();
        assert!(json.contains("\"epoch\":[]"));
    }

    #[test]
    fn series_stay_index_aligned() {
        let mut history = History::new();
        for e in 1..=3 {
            history.push(record(e));
        }
        let series = history.snapshot().to_series();
        assert_eq!(series.epoch, vec![1, 2, 3]);
        assert_eq!(series.validation_loss, vec![2.0, 1.0, 2.0 / 3.0]);
        assert_eq!(series.sample_prediction, vec![1, 2, 3]);
    }
}

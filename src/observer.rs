//! Consumer side of the snapshot hand-off.
//!
//! The driver owns the `Sender`; the observer owns the `Receiver` and polls it
//! on its own schedule, keeping only the newest snapshot.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::train::history::MetricSnapshot;

/// Creates a connected publisher/observer pair.
pub fn snapshot_channel() -> (Sender<MetricSnapshot>, MetricsObserver) {
    let (tx, rx) = mpsc::channel();
    (tx, MetricsObserver::new(rx))
}

/// Polls for metric snapshots published by a `TrainingDriver`.
#[derive(Debug)]
pub struct MetricsObserver {
    rx: Receiver<MetricSnapshot>,
    latest: MetricSnapshot,
    finished: bool,
}

impl MetricsObserver {
    pub fn new(rx: Receiver<MetricSnapshot>) -> Self {
        MetricsObserver { rx, latest: MetricSnapshot::default(), finished: false }
    }

    /// Drains everything published since the last poll and returns the newest
    /// snapshot. Polling again with nothing new returns the same snapshot.
    pub fn poll(&mut self) -> &MetricSnapshot {
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => self.latest = snapshot,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
        &self.latest
    }

    /// The snapshot returned by the last `poll`, without polling.
    pub fn latest(&self) -> &MetricSnapshot {
        &self.latest
    }

    /// True once the producer has hung up and everything it sent was drained.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::info;

use digit_dash::{MetricSnapshot, MetricsObserver};

// ---------------------------------------------------------------------------
// Run status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The training thread is still publishing.
    Running,
    /// Every epoch completed; the last snapshot is final.
    Finished,
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

/// What HTTP handlers read. Only the refresh timer writes it.
pub struct DashboardState {
    /// Newest snapshot the observer has seen; swapped whole, never edited.
    pub snapshot:         MetricSnapshot,
    pub status:           RunStatus,
    pub total_epochs:     usize,
    pub refresh_interval: Duration,
}

impl DashboardState {
    pub fn new(total_epochs: usize, refresh_interval: Duration) -> Self {
        DashboardState {
            snapshot: MetricSnapshot::default(),
            status: RunStatus::Running,
            total_epochs,
            refresh_interval,
        }
    }
}

/// Shared state type: an `Arc<Mutex<DashboardState>>` passed to every handler.
pub type SharedState = Arc<Mutex<DashboardState>>;

/// Locks the state, recovering the guard if a handler thread panicked with it held.
pub fn lock(state: &SharedState) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Refresh timer
// ---------------------------------------------------------------------------

/// One timer tick: polls the observer and copies anything new into `state`.
pub fn refresh(observer: &mut MetricsObserver, state: &SharedState) {
    let snapshot = observer.poll().clone();
    let finished = observer.is_finished();

    let mut st = lock(state);
    if snapshot.len() != st.snapshot.len() {
        st.snapshot = snapshot;
    }
    if finished && st.status == RunStatus::Running {
        st.status = RunStatus::Finished;
        info!(
            "training finished after {} epochs; dashboard stays up until the process is stopped",
            st.snapshot.len()
        );
    }
}

/// Polls forever at a fixed interval, independent of when epochs end.
pub fn refresh_forever(mut observer: MetricsObserver, state: SharedState) -> ! {
    let interval = lock(&state).refresh_interval;
    loop {
        refresh(&mut observer, &state);
        std::thread::sleep(interval);
    }
}

use std::io::Cursor;
use serde::Serialize;
use tiny_http::Response;

use digit_dash::train::{EpochRecord, SnapshotSeries};

use crate::routes::{json_response, server_error};
use crate::state::{lock, DashboardState, RunStatus, SharedState};

/// JSON body shared by `/metrics`, the `snapshot` SSE event and the page
/// bootstrap.
#[derive(Serialize)]
pub struct Payload<'a> {
    pub total_epochs: usize,
    pub finished:     bool,
    /// Headline values; `null` before the first epoch.
    pub latest:       Option<&'a EpochRecord>,
    pub series:       SnapshotSeries,
}

pub fn payload(state: &DashboardState) -> Payload<'_> {
    Payload {
        total_epochs: state.total_epochs,
        finished: state.status == RunStatus::Finished,
        latest: state.snapshot.latest(),
        series: state.snapshot.to_series(),
    }
}

/// Serialized payload; `{}` if serialization ever fails so the page still loads.
pub fn payload_json(state: &DashboardState) -> String {
    serde_json::to_string(&payload(state)).unwrap_or_else(|_| "{}".to_owned())
}

/// `GET /metrics`: the newest snapshot as JSON.
pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let json = {
        let st = lock(&state);
        serde_json::to_string(&payload(&st))
    };
    match json {
        Ok(json) => json_response(json),
        Err(e)   => server_error(&format!("failed to serialize metrics: {}", e)),
    }
}

use tiny_http::Request;

use crate::handlers::metrics::payload_json;
use crate::state::{lock, RunStatus, SharedState};
use crate::util::sse::{format_sse_event, write_all, SSE_HEADER, SSE_KEEPALIVE};

/// Keep-alive is sent after this many idle ticks.
const PING_EVERY: u32 = 5;

/// `GET /events`: Server-Sent Events handler.
///
/// Takes ownership of `request` to write on the raw stream, then loops at
/// the refresh interval:
/// 1. When the shared snapshot holds more epochs than this client has seen,
///    it sends a `snapshot` event with the full payload.
/// 2. Otherwise, every few idle ticks, it sends a `: ping` comment.
/// 3. Once training has finished and the final snapshot went out, it sends
///    `done` and closes.
///
/// A client connecting mid-run gets the current snapshot immediately.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    if write_all(&mut writer, SSE_HEADER.as_bytes()).is_err() {
        return;
    }

    let mut sent_epochs = 0usize;
    let mut idle_ticks  = 0u32;

    loop {
        let (frame, finished, interval) = {
            let st = lock(&state);
            let frame = if st.snapshot.len() > sent_epochs {
                sent_epochs = st.snapshot.len();
                Some(format_sse_event("snapshot", &payload_json(&st)))
            } else {
                None
            };
            (frame, st.status == RunStatus::Finished, st.refresh_interval)
        };

        match frame {
            Some(frame) => {
                idle_ticks = 0;
                if write_all(&mut writer, frame.as_bytes()).is_err() {
                    return;
                }
            }
            None if finished => {
                let done = format_sse_event("done", &format!("{{\"epochs\":{}}}", sent_epochs));
                let _ = write_all(&mut writer, done.as_bytes());
                return;
            }
            None => {
                idle_ticks += 1;
                if idle_ticks >= PING_EVERY {
                    idle_ticks = 0;
                    // Browser tab closed.
                    if write_all(&mut writer, SSE_KEEPALIVE.as_bytes()).is_err() {
                        return;
                    }
                }
            }
        }

        std::thread::sleep(interval);
    }
}

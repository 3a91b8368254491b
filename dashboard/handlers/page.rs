use std::io::Cursor;
use tiny_http::Response;

use crate::render::render_page;
use crate::routes::html_response;
use crate::state::{lock, SharedState};

/// `GET /`: the dashboard page, pre-filled with the current snapshot.
pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let html = render_page(&lock(&state));
    html_response(html)
}

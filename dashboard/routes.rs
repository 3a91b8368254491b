use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

type Body = Response<Cursor<Vec<u8>>>;

fn content_type(value: &str) -> Vec<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .ok()
        .into_iter()
        .collect()
}

fn respond_with(status: u16, mime: &str, bytes: Vec<u8>) -> Body {
    let len = bytes.len();
    Response::new(StatusCode(status), content_type(mime), Cursor::new(bytes), Some(len), None)
}

pub fn html_response(body: String) -> Body {
    respond_with(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response(body: String) -> Body {
    respond_with(200, "application/json", body.into_bytes())
}

pub fn png_response(bytes: Vec<u8>) -> Body {
    respond_with(200, "image/png", bytes)
}

pub fn not_found() -> Body {
    respond_with(404, "text/plain", b"404 Not Found".to_vec())
}

pub fn server_error(message: &str) -> Body {
    respond_with(500, "text/plain", message.as_bytes().to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// The SSE handler takes ownership of the request to stream on the raw
/// writer; every other route answers with a single buffered response.
pub fn dispatch(request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    // Query strings only bust browser caches here; routing ignores them.
    let path = url.split('?').next().unwrap_or("");

    if method == Method::Get && path == "/events" {
        handlers::events::handle(request, state);
        return;
    }

    let response = match (method, path) {
        (Method::Get, "/")           => handlers::page::handle_get(state),
        (Method::Get, "/metrics")    => handlers::metrics::handle_get(state),
        (Method::Get, "/sample.png") => handlers::sample::handle_get(state),
        _ => not_found(),
    };

    let _ = request.respond(response);
}

use std::io::Cursor;
use log::warn;
use tiny_http::Response;

use crate::routes::{not_found, png_response, server_error};
use crate::state::{lock, SharedState};
use crate::util::image::sample_to_png;

/// `GET /sample.png`: the latest epoch's sampled validation digit.
///
/// 404 until the first epoch has been published.
pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let sample = match lock(&state).snapshot.latest() {
        Some(record) => record.sample.clone(),
        None => return not_found(),
    };

    match sample_to_png(&sample) {
        Ok(png) => png_response(png),
        Err(e) => {
            warn!("could not encode sample image: {}", e);
            server_error("failed to encode sample image")
        }
    }
}

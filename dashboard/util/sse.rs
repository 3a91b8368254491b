use std::io::Write;

// ---------------------------------------------------------------------------
// SSE response helpers
// ---------------------------------------------------------------------------

/// Raw HTTP response head for an event stream; the body follows on the same
/// writer.
pub const SSE_HEADER: &str = "HTTP/1.1 200 OK\r\n\
                              Content-Type: text/event-stream\r\n\
                              Cache-Control: no-cache\r\n\
                              Connection: keep-alive\r\n\
                              X-Accel-Buffering: no\r\n\
                              \r\n";

/// Keep-alive SSE comment.
/// SSE comments start with `:` and are ignored by EventSource clients
/// but prevent the connection from timing out.
pub const SSE_KEEPALIVE: &str = ": ping\n\n";

/// Formats a named SSE event with a JSON data payload.
///
/// Output format:
/// ```text
/// event: <name>\n
/// data: <json>\n
/// \n
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Writes all bytes to the writer and flushes, returning `Err` on any I/O
/// failure (typically the browser tab was closed).
pub fn write_all<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    w.write_all(data)?;
    w.flush()
}

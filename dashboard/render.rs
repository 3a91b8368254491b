//! Page renderer for the dashboard.
//!
//! One HTML template (`dashboard/assets/dashboard.html`) with `{{TOKEN}}`
//! placeholders, loaded at compile time. The page bootstraps from the
//! snapshot embedded here and then follows `/events`.

use crate::handlers::metrics::payload_json;
use crate::state::{DashboardState, RunStatus};

const TEMPLATE: &str = include_str!("assets/dashboard.html");

/// Renders the full dashboard page for the current state.
pub fn render_page(state: &DashboardState) -> String {
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{TOTAL_EPOCHS}}",    &state.total_epochs.to_string());
    html = html.replace("{{REFRESH_MS}}",      &state.refresh_interval.as_millis().to_string());
    html = html.replace("{{FINISHED}}",        if state.status == RunStatus::Finished { "true" } else { "false" });
    html = html.replace("{{INITIAL_PAYLOAD}}", &payload_json(state));

    blank_remaining(html)
}

/// Replaces any `{{UPPERCASE_TOKEN}}` that wasn't substituted with an empty
/// string, so a missed token never leaks into the page.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        match html[start..].find("}}") {
            Some(end) => html.replace_range(start..start + end + 2, ""),
            None => break,
        }
    }
    html
}

//! digit-dash live dashboard
//!
//! Trains in the background and serves the metrics in the browser while the
//! epochs run. Served by a synchronous tiny_http server; the page itself is a
//! single HTML file with no JavaScript frameworks.
//!
//! Run with:
//!   cargo run --bin dashboard --release
//! Then open the address printed in the banner (default http://127.0.0.1:7878).
//!
//! Threads:
//!   training: the epoch loop; publishes one snapshot per epoch
//!   http:     accepts requests, one thread per request
//!   main:     refresh timer; polls for snapshots at a fixed interval

mod handlers;
mod render;
mod routes;
mod state;
mod util;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{error, info};
use tiny_http::Server;

use digit_dash::{logging, snapshot_channel, DefaultSession, TrainConfig, TrainingDriver};

use state::DashboardState;

fn main() {
    logging::init();

    let config = match TrainConfig::resolve() {
        Ok(c) => c,
        Err(e) => fail(&format!("invalid configuration: {}", e)),
    };
    let session = match DefaultSession::from_config(&config) {
        Ok(s) => s,
        Err(e) => fail(&format!("could not prepare training: {}", e)),
    };
    let server = match Server::http(config.dashboard_addr.as_str()) {
        Ok(s) => s,
        Err(e) => fail(&format!("failed to bind {}: {}", config.dashboard_addr, e)),
    };

    let refresh = Duration::from_millis(config.refresh_interval_ms.max(1));
    let shared_state = Arc::new(Mutex::new(DashboardState::new(config.epochs, refresh)));

    let (tx, observer) = snapshot_channel();
    let mut driver = TrainingDriver::new(session, config.epochs);
    driver.attach(tx);

    println!("╔══════════════════════════════════════════════╗");
    println!("║          digit-dash dashboard                ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", config.dashboard_addr);
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Epochs: {:<36}║", config.epochs);
    println!("╚══════════════════════════════════════════════╝");

    // The driver (and with it the sender) drops when this thread ends, which
    // is how the refresh timer learns that training finished.
    let spawned = std::thread::Builder::new()
        .name("training".into())
        .spawn(move || {
            if let Err(e) = driver.run() {
                error!("training aborted: {}", e);
                std::process::exit(1);
            }
        });
    if let Err(e) = spawned {
        fail(&format!("could not start the training thread: {}", e));
    }

    let http_state = shared_state.clone();
    let spawned = std::thread::Builder::new()
        .name("http".into())
        .spawn(move || {
            // Each request gets its own thread so a long-lived /events stream
            // does not stall page loads.
            for request in server.incoming_requests() {
                let state_clone = http_state.clone();
                std::thread::spawn(move || {
                    routes::dispatch(request, state_clone);
                });
            }
        });
    if let Err(e) = spawned {
        fail(&format!("could not start the http thread: {}", e));
    }

    info!("dashboard listening on http://{}", config.dashboard_addr);
    state::refresh_forever(observer, shared_state);
}

fn fail(message: &str) -> ! {
    error!("{}", message);
    std::process::exit(1);
}

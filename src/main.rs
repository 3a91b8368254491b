//! Headless trainer: runs the full epoch loop with no observer attached and
//! logs one line per epoch.
//!
//! Run with:
//!   cargo run --release
//! Use `cargo run --release --bin dashboard` for the live dashboard.

use log::error;

use digit_dash::{logging, DefaultSession, Result, TrainConfig, TrainingDriver};

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!("training aborted: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = TrainConfig::resolve()?;
    let session = DefaultSession::from_config(&config)?;

    let mut driver = TrainingDriver::new(session, config.epochs);
    let snapshot = driver.run()?;

    if let Some(last) = snapshot.latest() {
        println!();
        println!("Finished {} epochs.", last.epoch);
        println!("  Train loss:          {:.6}", last.train_loss);
        println!("  Train accuracy:      {:.2}%", last.train_accuracy * 100.0);
        println!("  Validation loss:     {:.6}", last.validation_loss);
        println!("  Validation accuracy: {:.2}%", last.validation_accuracy * 100.0);
    }
    Ok(())
}

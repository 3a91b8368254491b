pub mod events;
pub mod metrics;
pub mod page;
pub mod sample;

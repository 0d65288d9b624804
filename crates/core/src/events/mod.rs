//! Observer channel for queue activity.
//!
//! Every state or progress change in the queue is published as a
//! [`QueueEvent`] on a broadcast bus. This stream is the only interface a
//! presentation layer needs: per-job updates plus batch-level progress
//! signals.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::QueueEvent;

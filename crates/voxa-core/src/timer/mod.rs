//! Countdown timers.

pub mod registry;

pub use registry::{CancelOutcome, QueryOutcome, TimerCallbacks, TimerRegistry};

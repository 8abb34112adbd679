//! Lifecycle supervisor for a single-job worker process.
//!
//! The process is booked exactly one job by the scheduling platform,
//! executes it under a shared cancellation token, converts SIGTERM and
//! SIGINT into cancellation, drains buffered telemetry on every exit
//! path, and translates failures into a non-zero exit after a fixed
//! grace delay.

pub mod config;
pub mod engine;
pub mod error;
pub mod runner;
pub mod shutdown;
pub mod telemetry;

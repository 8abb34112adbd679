//! Lifecycle runner for a single booked job.
//!
//! A run moves through: validating the booked job id, executing the
//! entry point under the shared cancellation token, then the ordered
//! shutdown sequence. Every outcome (success, failure, signal-driven
//! cancellation) goes through [`shutdown::finish`]; a missing job id
//! exits before a token or signal listener ever exists.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::config::{JobId, RunConfig};
use crate::error::{ExecutionError, WorkerError};
use crate::shutdown::{self, SignalBridge};
use crate::telemetry::DrainHandle;

/// Execute the booked job and return the process exit code.
///
/// `entry_point` is the execution engine: it receives the cancellation
/// token and the validated job id, and is expected to observe the token
/// and return early with an error if it is cancelled mid-execution.
/// No retry logic lives here; failures are terminal for this process
/// and the platform re-books the job on a fresh worker instance.
pub async fn run<F, Fut>(config: &RunConfig, drain: Option<DrainHandle>, entry_point: F) -> u8
where
    F: FnOnce(CancellationToken, JobId) -> Fut,
    Fut: Future<Output = Result<(), ExecutionError>>,
{
    // Fatal configuration error: no job is ever attempted and no drain
    // is needed, nothing was logged through the sink yet.
    let job_id = match config.job_id() {
        Ok(id) => id,
        Err(err) => return startup_failure(err),
    };

    let token = CancellationToken::new();
    let bridge = match SignalBridge::install(token.clone()) {
        Ok(bridge) => bridge,
        Err(err) => return startup_failure(WorkerError::Signal(err)),
    };

    tracing::info!(job_id, "starting worker for booked job");
    let result = entry_point(token.clone(), job_id).await;
    if result.is_ok() {
        tracing::info!(job_id, "worker finished");
    }

    shutdown::finish(token, bridge, drain, result).await
}

/// Immediate non-zero exit before any work began: message to stderr,
/// no cancellation context, no drain.
fn startup_failure(err: WorkerError) -> u8 {
    eprintln!("error: {err}");
    1
}

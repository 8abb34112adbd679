//! Signal handling and the ordered shutdown sequence.
//!
//! [`SignalBridge`] converts SIGINT/SIGTERM into cancellation of the
//! shared `CancellationToken`. [`finish`] is the single control point
//! every exit path goes through: cancel the token, stop the signal
//! listener, emit the failure diagnostic, drain telemetry, hold the
//! grace delay, and produce the process exit code.

use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;
use crate::telemetry::DrainHandle;

/// Fixed wait before terminating on a failure, allowing asynchronous
/// telemetry transport to complete delivery.
pub const GRACE_DELAY: Duration = Duration::from_secs(2);

/// Upper bound on waiting for the signal listener to wind down.
const LISTENER_STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Background listener that cancels the run token on SIGTERM or SIGINT.
///
/// The listener is a structured task: the shutdown sequence joins it
/// (bounded) instead of leaving it live past process exit. Dropping the
/// signal streams when the task returns unregisters the OS-level
/// interest.
pub struct SignalBridge {
    task: JoinHandle<()>,
}

impl SignalBridge {
    /// Register interest in SIGTERM and SIGINT, then spawn the
    /// listener. Registration happens before spawning so failures
    /// surface at install time.
    ///
    /// The listener cancels `token` at most once, on the first signal,
    /// and returns. If the token is cancelled by another path first it
    /// returns without touching it, so it never keeps draining signals
    /// during the process's natural shutdown.
    pub fn install(token: CancellationToken) -> std::io::Result<Self> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, cancelling run");
                    token.cancel();
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT, cancelling run");
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        });

        Ok(Self { task })
    }

    /// Wait for the listener to finish. Called after the token has been
    /// cancelled, so the task is already unblocked; the timeout only
    /// guards against a wedged listener holding up exit.
    pub async fn stop(mut self) {
        match tokio::time::timeout(LISTENER_STOP_TIMEOUT, &mut self.task).await {
            Ok(Ok(())) => {}
            Ok(Err(join_err)) => {
                tracing::warn!(error = %join_err, "signal listener task failed");
            }
            Err(_) => {
                tracing::warn!("signal listener did not stop in time, abandoning it");
                self.task.abort();
            }
        }
    }
}

/// Run the ordered shutdown sequence and translate the run result into
/// a process exit code.
///
/// Order on every path: cancel the token, join the signal listener,
/// emit the failure diagnostic (error path), flush the telemetry sink,
/// hold the grace delay (error path), return the code. The drain runs
/// strictly after the final log line of the run so the line describing
/// a failure is itself captured by the flush.
///
/// Cancellation happens before the listener is joined, not after it is
/// unregistered: the listener blocks on the token, so cancelling is
/// what unblocks it, and its signal registrations drop when it
/// returns. A signal landing in that window finds the token already
/// cancelled and has no further effect, so the outcome is the same as
/// stopping the listener first.
pub async fn finish(
    token: CancellationToken,
    bridge: SignalBridge,
    drain: Option<DrainHandle>,
    result: Result<(), ExecutionError>,
) -> u8 {
    token.cancel();
    bridge.stop().await;

    if let Err(err) = &result {
        // One diagnostic line per failure. The correlation id, when the
        // platform assigned one, rides along as a structured field.
        match err.request_id() {
            Some(request_id) => {
                tracing::error!(%request_id, canceled = err.is_canceled(), error = %err, "job execution failed");
            }
            None => {
                tracing::error!(canceled = err.is_canceled(), error = %err, "job execution failed");
            }
        }
    }

    if let Some(drain) = &drain {
        tracing::info!("draining logs");
        if let Err(e) = drain.drain() {
            eprintln!("error: draining logs: {e}");
        }
    }

    match result {
        Ok(()) => 0,
        Err(err) => {
            tokio::time::sleep(GRACE_DELAY).await;
            eprintln!("error: {err}");
            1
        }
    }
}

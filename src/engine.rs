//! Execution entry point: runs the booked job's shell payload.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::JobId;
use crate::error::ExecutionError;

/// Execute the booked job's command, honoring cancellation.
///
/// The payload runs under `sh -c` with stdout and stderr captured.
/// Captured stdout is logged when the job completes; captured stderr
/// rides along in the failure error so the diagnostic line names the
/// actual cause, not just the exit status. Cancellation is cooperative
/// from the supervisor's point of view: when the token fires
/// mid-execution the child is killed and a canceled error is returned,
/// which the shutdown sequence treats like any other failure so the
/// platform re-books the job.
pub async fn start_worker(
    token: CancellationToken,
    job_id: JobId,
    command: &str,
) -> Result<(), ExecutionError> {
    tracing::info!(job_id, command, "executing booked job");

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecutionError::new(format!("spawning job process: {e}")))?;

    // Drain the pipes concurrently so a chatty job can never fill a
    // pipe buffer and wedge itself before `wait` returns.
    let stdout_task = tokio::spawn(read_pipe(child.stdout.take()));
    let stderr_task = tokio::spawn(read_pipe(child.stderr.take()));

    tokio::select! {
        _ = token.cancelled() => {
            tracing::warn!(job_id, "cancellation requested, stopping job");
            if let Err(e) = child.kill().await {
                tracing::warn!(job_id, error = %e, "failed to kill job process");
            }
            // Killing the child closes the pipes; the readers finish on EOF.
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            Err(ExecutionError::canceled("job canceled before completion"))
        }
        status = child.wait() => {
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            match status {
                Ok(status) if status.success() => {
                    if stdout.is_empty() {
                        tracing::info!(job_id, "job completed");
                    } else {
                        tracing::info!(job_id, output = %stdout.trim_end(), "job completed");
                    }
                    Ok(())
                }
                Ok(status) => {
                    let stderr = stderr.trim();
                    Err(if stderr.is_empty() {
                        ExecutionError::new(format!("job exited with {status}"))
                    } else {
                        ExecutionError::new(format!("job exited with {status}: {stderr}"))
                    })
                }
                Err(e) => Err(ExecutionError::new(format!("waiting for job process: {e}"))),
            }
        }
    }
}

/// Read a child pipe to EOF, lossily decoded. Missing pipe or read
/// errors yield whatever was collected.
async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

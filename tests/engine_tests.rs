use std::time::{Duration, Instant};

use job_worker::engine;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn executes_simple_command() {
    let token = CancellationToken::new();
    let result = engine::start_worker(token, 1, "true").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn completes_command_with_output() {
    let token = CancellationToken::new();
    let result = engine::start_worker(token, 3, "echo hello").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn reports_nonzero_exit_as_failure() {
    let token = CancellationToken::new();
    let err = engine::start_worker(token, 2, "exit 3")
        .await
        .unwrap_err();
    assert!(!err.is_canceled());
    assert!(err.to_string().contains("exit"), "got: {err}");
}

#[tokio::test]
async fn failure_error_carries_child_stderr() {
    let token = CancellationToken::new();
    let err = engine::start_worker(token, 4, "echo disk quota exceeded >&2; exit 3")
        .await
        .unwrap_err();
    assert!(!err.is_canceled());
    assert!(
        err.to_string().contains("disk quota exceeded"),
        "error does not carry captured stderr: {err}"
    );
}

#[tokio::test]
async fn large_output_does_not_wedge_the_job() {
    let token = CancellationToken::new();
    // Well past a pipe buffer on both streams.
    let result = engine::start_worker(token, 5, "seq 1 20000; seq 1 20000 >&2; true").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn cancellation_stops_a_long_running_job() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    let start = Instant::now();

    let (result, ()) = tokio::join!(engine::start_worker(token, 555, "sleep 5"), async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = result.unwrap_err();
    assert!(err.is_canceled());
    // The job is killed promptly, long before its own duration.
    assert!(start.elapsed() < Duration::from_secs(2));
}

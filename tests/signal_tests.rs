//! Signal-driven shutdown tests. These raise real signals, so they
//! live in their own test binary and install handlers up front.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use job_worker::config::RunConfig;
use job_worker::error::ExecutionError;
use job_worker::runner;
use job_worker::shutdown::SignalBridge;
use job_worker::telemetry::{Drain, DrainHandle};
use tokio_util::sync::CancellationToken;

struct CountingDrain(AtomicUsize);

impl Drain for CountingDrain {
    fn drain(&self) -> io::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn raise(signal: libc::c_int) {
    // SAFETY: raising a signal we registered a handler for.
    unsafe {
        libc::raise(signal);
    }
}

#[tokio::test]
async fn sigterm_cancels_token_and_second_signal_is_noop() {
    let token = CancellationToken::new();
    let bridge = SignalBridge::install(token.clone()).unwrap();

    raise(libc::SIGTERM);

    tokio::time::timeout(Duration::from_secs(2), token.cancelled())
        .await
        .expect("token should be cancelled after SIGTERM");
    assert!(token.is_cancelled());

    // The listener has stopped, so a repeat signal has no further
    // effect and the task is joinable.
    raise(libc::SIGTERM);
    token.cancel();
    assert!(token.is_cancelled());
    bridge.stop().await;
}

#[tokio::test]
async fn sigterm_during_execution_fails_the_run() {
    let drain = Arc::new(CountingDrain(AtomicUsize::new(0)));
    let handle = DrainHandle::new(drain.clone());

    let config = RunConfig::new(Some(555), "true");
    let code = runner::run(&config, Some(handle), |token, job_id| async move {
        assert_eq!(job_id, 555);
        // The signal arrives shortly into execution; the entry point
        // observes cancellation and returns an error promptly.
        tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            raise(libc::SIGTERM);
        });
        token.cancelled().await;
        Err(ExecutionError::canceled("job canceled before completion"))
    })
    .await;

    assert_eq!(code, 1);
    assert_eq!(drain.0.load(Ordering::SeqCst), 1);
}

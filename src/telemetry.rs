//! Telemetry setup and the drain hook used at shutdown.
//!
//! The fmt subscriber writes through a buffered sink, and `init`
//! returns a [`DrainHandle`] for that sink explicitly. The shutdown
//! sequence invokes the handle exactly once, after the final log line
//! of the run, so nothing buffered is lost on exit. There is no global
//! registry to walk: whoever sets up telemetry owns threading the
//! handle to shutdown.

use std::io::{self, BufWriter, Stderr, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// A sink holding buffered telemetry records that can be flushed on
/// demand. Implementations are responsible for bounding the flush
/// internally (a network-backed sink would apply its own timeout).
pub trait Drain: Send + Sync {
    fn drain(&self) -> io::Result<()>;
}

/// Cloneable reference to the process-wide buffered sink.
#[derive(Clone)]
pub struct DrainHandle {
    sink: Arc<dyn Drain>,
}

impl DrainHandle {
    pub fn new(sink: Arc<dyn Drain>) -> Self {
        Self { sink }
    }

    /// Flush pending buffered records, blocking until acknowledged.
    pub fn drain(&self) -> io::Result<()> {
        self.sink.drain()
    }
}

/// Buffered writer sink. Log lines accumulate in the internal buffer
/// and reach the destination when the buffer fills or [`Drain::drain`]
/// runs.
pub struct BufferedSink<W: Write + Send> {
    inner: Mutex<BufWriter<W>>,
}

/// The sink installed by [`init`]: buffered stderr.
pub type BufferedStderrSink = BufferedSink<Stderr>;

impl<W: Write + Send> BufferedSink<W> {
    pub fn new(dest: W) -> Self {
        Self {
            inner: Mutex::new(BufWriter::new(dest)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufWriter<W>> {
        // A panic while holding the guard leaves the buffer intact;
        // keep draining rather than losing the tail of the log.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Drain for BufferedSink<W> {
    fn drain(&self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// Writer handed to the fmt layer for each event.
pub struct SinkWriter<W: Write + Send>(Arc<BufferedSink<W>>);

impl<W: Write + Send> Write for SinkWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().flush()
    }
}

/// `MakeWriter` adapter over the shared sink.
pub struct SinkMakeWriter<W: Write + Send>(Arc<BufferedSink<W>>);

impl<'a, W: Write + Send> MakeWriter<'a> for SinkMakeWriter<W> {
    type Writer = SinkWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter(self.0.clone())
    }
}

/// Install the fmt subscriber writing through a buffered stderr sink
/// and return the drain handle for it.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> DrainHandle {
    let sink = Arc::new(BufferedStderrSink::new(io::stderr()));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(SinkMakeWriter(sink.clone()))
        .init();

    DrainHandle::new(sink)
}

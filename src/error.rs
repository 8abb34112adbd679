use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("flag --booked-job-id is mandatory and must be a positive integer")]
    MissingJobId,

    #[error("installing signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

/// Error returned by the execution entry point.
///
/// Carries an optional correlation/request id assigned by the platform,
/// used only for diagnostics. Never retried or wrapped further: every
/// execution failure is terminal for this process instance.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ExecutionError {
    message: String,
    request_id: Option<String>,
    canceled: bool,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            request_id: None,
            canceled: false,
        }
    }

    /// Error produced because the cancellation token fired mid-execution.
    /// Treated as a failure for exit-code purposes, same as any other error.
    pub fn canceled(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            request_id: None,
            canceled: true,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;

use crate::error::{Result, WorkerError};

/// Identifier of the booked unit of work this process must execute.
/// Always positive; assigned by the platform when the job was booked.
pub type JobId = i64;

/// Configuration for a single worker run.
///
/// Populated from command-line flags or environment variables by the
/// binary; immutable once read at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Raw booked job id as provided externally. `None` or a
    /// non-positive value is a fatal configuration error.
    pub booked_job_id: Option<i64>,

    /// Shell command that is the payload of the booked job, when one
    /// was delivered.
    pub command: Option<String>,
}

impl RunConfig {
    pub fn new(booked_job_id: Option<i64>, command: impl Into<String>) -> Self {
        Self {
            booked_job_id,
            command: Some(command.into()),
        }
    }

    /// A run booked without a delivered payload.
    pub fn without_payload(booked_job_id: Option<i64>) -> Self {
        Self {
            booked_job_id,
            command: None,
        }
    }

    /// Validate the mandatory booked job id.
    ///
    /// Absence is a fatal configuration error, not a retryable one: the
    /// process terminates before any job is attempted.
    pub fn job_id(&self) -> Result<JobId> {
        match self.booked_job_id {
            Some(id) if id > 0 => Ok(id),
            _ => Err(WorkerError::MissingJobId),
        }
    }

    /// Shell payload to execute. A worker started without a delivered
    /// payload runs the no-op payload and says so, rather than
    /// silently reporting success for work that never existed.
    pub fn payload(&self) -> String {
        match &self.command {
            Some(command) => command.clone(),
            None => {
                tracing::warn!("no job payload delivered, running the no-op payload");
                "true".to_string()
            }
        }
    }
}

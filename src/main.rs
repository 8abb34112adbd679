use std::process::ExitCode;

use clap::Parser;

use job_worker::config::RunConfig;
use job_worker::{engine, runner, telemetry};

#[derive(Parser, Debug)]
#[command(name = "job-worker")]
#[command(version)]
#[command(about = "Runs a single booked job on behalf of the scheduling platform")]
struct Args {
    /// Identifier of the job booked to this worker (mandatory, positive)
    #[arg(long, env = "WORKER_BOOKED_JOB_ID")]
    booked_job_id: Option<i64>,

    /// Shell command payload of the booked job, as delivered by the platform
    #[arg(long, env = "WORKER_JOB_COMMAND")]
    job_command: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Telemetry first so everything after it is captured; the drain
    // handle is threaded explicitly into the shutdown sequence.
    let drain = telemetry::init();

    let config = match args.job_command {
        Some(command) => RunConfig::new(args.booked_job_id, command),
        None => RunConfig::without_payload(args.booked_job_id),
    };
    let command = config.payload();

    let code = runner::run(&config, Some(drain), move |token, job_id| async move {
        engine::start_worker(token, job_id, &command).await
    })
    .await;

    ExitCode::from(code)
}

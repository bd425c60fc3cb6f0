// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Submission executor — one attempt against a validated, ready device.
//
// Steps: destination check, readiness gate, spool to temp file, hand to
// the driver, poll the active-queue listing until the native id
// disappears. Driver error text is classified by `classify`; this module
// holds no opinion on transient-vs-fatal.

use std::io::Write;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use druckwerk_core::types::{Job, JobOutcome, PrintMethod};

use crate::classify::classify;
use crate::cups::PrintDriver;
use crate::probe::StatusProbe;
use crate::raw;
use crate::readiness::ReadinessGate;

/// Interval between completion-poll queries.
const COMPLETION_POLL: Duration = Duration::from_secs(1);

/// Seam between the consumer and the executor, so retry/ack logic can be
/// exercised without a device.
#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, job: &Job) -> JobOutcome;
}

/// Drives a single submission attempt to a terminal [`JobOutcome`].
pub struct SubmissionExecutor<D, P> {
    driver: D,
    probe: P,
    gate: ReadinessGate,
    completion_timeout: Duration,
    raw_timeout: Duration,
    raw_port: u16,
    /// Dry-run: skip the physical submission and report success.
    disable_print: bool,
}

impl<D: PrintDriver, P: StatusProbe> SubmissionExecutor<D, P> {
    pub fn new(
        driver: D,
        probe: P,
        gate: ReadinessGate,
        completion_timeout: Duration,
        raw_timeout: Duration,
        disable_print: bool,
    ) -> Self {
        Self {
            driver,
            probe,
            gate,
            completion_timeout,
            raw_timeout,
            raw_port: raw::RAW_PORT,
            disable_print,
        }
    }

    /// Override the raw TCP port (tests, unusual devices).
    pub fn with_raw_port(mut self, port: u16) -> Self {
        self.raw_port = port;
        self
    }

    /// Submit one job and determine its outcome.
    pub async fn submit(&self, job: &Job) -> JobOutcome {
        if self.disable_print {
            info!(job_id = %job.id, printer = %job.printer, "printing disabled, reporting success");
            return JobOutcome::success(None);
        }

        match job.method {
            PrintMethod::Raw => self.submit_raw(job).await,
            PrintMethod::Cups => self.submit_cups(job).await,
        }
    }

    async fn submit_raw(&self, job: &Job) -> JobOutcome {
        match raw::send_raw(&job.printer, self.raw_port, &job.payload, self.raw_timeout).await {
            Ok(()) => JobOutcome::success(None),
            Err(raw_err) => {
                warn!(job_id = %job.id, error = %raw_err, "raw submission failed");
                JobOutcome::from_classified(classify(&raw_err), raw_err)
            }
        }
    }

    async fn submit_cups(&self, job: &Job) -> JobOutcome {
        // A misconfigured destination name is a distinct, usually fatal
        // condition; readiness polling would never clear it.
        if let Err(raw_err) = self.driver.destination_exists(&job.printer).await {
            warn!(job_id = %job.id, printer = %job.printer, error = %raw_err, "destination check failed");
            return JobOutcome::from_classified(classify(&raw_err), raw_err);
        }

        if !self.gate.wait_until_ready(&self.probe, &job.printer).await {
            return JobOutcome::transient("device not ready");
        }

        let spool = match spool_payload(job) {
            Ok(file) => file,
            Err(io_err) => {
                warn!(job_id = %job.id, error = %io_err, "could not spool payload");
                return JobOutcome::from_classified(classify(&io_err), io_err);
            }
        };

        let device_job_id = match self.driver.submit_file(&job.printer, spool.path()).await {
            Ok(id) => id,
            Err(raw_err) => {
                warn!(job_id = %job.id, error = %raw_err, "driver submission failed");
                return JobOutcome::from_classified(classify(&raw_err), raw_err);
            }
        };

        self.wait_for_completion(job, &device_job_id).await
    }

    /// Poll the active-queue listing until the native id disappears.
    async fn wait_for_completion(&self, job: &Job, device_job_id: &str) -> JobOutcome {
        let deadline = Instant::now() + self.completion_timeout;

        loop {
            match self.driver.active_jobs(&job.printer).await {
                Ok(listing) => {
                    if !listing.contains(device_job_id) {
                        info!(job_id = %job.id, device_job_id, "job completed");
                        return JobOutcome::success(Some(device_job_id.to_string()));
                    }
                }
                Err(raw_err) => {
                    warn!(job_id = %job.id, error = %raw_err, "completion poll failed");
                    return JobOutcome::from_classified(classify(&raw_err), raw_err);
                }
            }

            if Instant::now() + COMPLETION_POLL > deadline {
                return JobOutcome::transient(format!(
                    "job {device_job_id} did not complete in time"
                ));
            }

            tokio::time::sleep(COMPLETION_POLL).await;
        }
    }
}

#[async_trait::async_trait]
impl<D: PrintDriver, P: StatusProbe> Submitter for SubmissionExecutor<D, P> {
    async fn submit(&self, job: &Job) -> JobOutcome {
        SubmissionExecutor::submit(self, job).await
    }
}

/// Write the payload to a temp file carrying the job's extension.
///
/// The file is removed when the handle drops, covering every exit path.
fn spool_payload(job: &Job) -> Result<tempfile::NamedTempFile, String> {
    let suffix = std::path::Path::new(&job.filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("druckwerk_")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| format!("spool file create: {e}"))?;

    file.write_all(&job.payload)
        .map_err(|e| format!("spool file write: {e}"))?;

    Ok(file)
}

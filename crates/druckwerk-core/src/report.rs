// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbound result reporting seam.
//
// The consumer announces every terminal decision through this trait; the
// HTTP implementation lives in druckwerk-report so the broker logic never
// depends on a web client.

use serde::Serialize;

use crate::types::{Job, JobOutcome, OutcomeStatus, PrintMethod};

/// Terminal status as reported to the tracking API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// Body of the result callback, sent once per terminal decision.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackReport {
    pub job_id: String,
    pub file: Option<String>,
    pub printer: String,
    pub method: PrintMethod,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_job_id: Option<String>,
}

impl CallbackReport {
    /// Build the callback body for a finished job.
    pub fn for_outcome(job: &Job, outcome: &JobOutcome) -> Self {
        let status = match outcome.status {
            OutcomeStatus::Success => ReportStatus::Success,
            _ => ReportStatus::Error,
        };
        Self {
            job_id: job.id.clone(),
            file: Some(job.filename.clone()),
            printer: job.printer.clone(),
            method: job.method,
            status,
            error: (status == ReportStatus::Error).then(|| outcome.detail.clone()),
            device_job_id: outcome.device_job_id.clone(),
        }
    }

    /// Callback for a task that never became a job (e.g. missing payload).
    pub fn rejected(
        job_id: impl Into<String>,
        printer: impl Into<String>,
        method: PrintMethod,
        error: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            file: None,
            printer: printer.into(),
            method,
            status: ReportStatus::Error,
            error: Some(error.into()),
            device_job_id: None,
        }
    }
}

/// Collaborator that delivers terminal results to the tracking service.
///
/// Implementations must never let delivery failures affect message
/// disposition; they log and swallow.
#[async_trait::async_trait]
pub trait OutcomeReporter: Send + Sync {
    async fn report(&self, report: &CallbackReport);
}

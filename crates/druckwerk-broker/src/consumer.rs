// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job consumer — resolves one queue message to exactly one terminal action.
//
// Parse failures are rejected without requeue (a parse failure is not
// retryable). Everything else flows through submit → retry policy until a
// terminal decision. The retry sleep races the supervisor's liveness
// watch, so a dead connection aborts the loop instead of sleeping blindly
// and the broker redelivers the un-acked message.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::watch;
use tracing::{error, info, warn};

use druckwerk_core::report::{CallbackReport, OutcomeReporter};
use druckwerk_core::state::SharedJobState;
use druckwerk_core::types::{Job, JobId, PrintMethod, PrintTask, RetryState};
use druckwerk_device::submit::Submitter;

use crate::retry::{Decision, RetryPolicy};

/// The single terminal action taken for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    /// Success — acknowledge.
    Ack,
    /// Fatal failure reported — acknowledge to consume the message.
    AckFatal,
    /// Malformed message — reject without requeue.
    Reject,
    /// Transient attempts exhausted — return to the broker.
    Requeue,
    /// Connection died mid-job — take no broker action; redelivery applies.
    Abandon,
}

/// Per-message orchestration: readiness/submission via the executor,
/// decisions via the retry policy, results via the reporter.
pub struct JobConsumer<S, R> {
    executor: S,
    policy: RetryPolicy,
    max_attempts: u32,
    job_state: SharedJobState,
    reporter: R,
    default_printer: String,
    default_method: PrintMethod,
}

impl<S: Submitter, R: OutcomeReporter> JobConsumer<S, R> {
    pub fn new(
        executor: S,
        policy: RetryPolicy,
        max_attempts: u32,
        job_state: SharedJobState,
        reporter: R,
        default_printer: String,
        default_method: PrintMethod,
    ) -> Self {
        Self {
            executor,
            policy,
            max_attempts,
            job_state,
            reporter,
            default_printer,
            default_method,
        }
    }

    /// Handle one delivery payload through to a terminal action.
    ///
    /// `alive` tracks the connection generation this delivery arrived on;
    /// when it flips to false the retry loop stops immediately.
    pub async fn handle(
        &self,
        payload: &[u8],
        alive: &mut watch::Receiver<bool>,
    ) -> TerminalAction {
        let task: PrintTask = match serde_json::from_slice(payload) {
            Ok(task) => task,
            Err(e) => {
                error!(error = %e, "malformed task message, rejecting without requeue");
                return TerminalAction::Reject;
            }
        };

        let job_id = task.job_id.unwrap_or_else(|| JobId::new().to_string());
        let printer = task
            .printer
            .unwrap_or_else(|| self.default_printer.clone());
        let method = task.method.unwrap_or(self.default_method);
        let filename = task
            .filename
            .unwrap_or_else(|| format!("print_job_{}.pdf", uuid::Uuid::new_v4().simple()));

        let payload = match task.content {
            Some(encoded) => match BASE64.decode(encoded.as_bytes()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    let detail = format!("document content is not valid base64: {e}");
                    warn!(job_id = %job_id, "{detail}");
                    self.reporter
                        .report(&CallbackReport::rejected(
                            job_id.clone(),
                            printer.clone(),
                            method,
                            detail,
                        ))
                        .await;
                    return TerminalAction::AckFatal;
                }
            },
            None => {
                let detail = "task carries no document content";
                warn!(job_id = %job_id, "{detail}");
                self.reporter
                    .report(&CallbackReport::rejected(
                        job_id.clone(),
                        printer.clone(),
                        method,
                        detail,
                    ))
                    .await;
                return TerminalAction::AckFatal;
            }
        };

        let job = Job {
            id: job_id,
            printer,
            filename,
            payload,
            method,
        };

        self.job_state.set(job.id.clone());
        let action = self.run_job(&job, alive).await;
        self.job_state.clear();
        action
    }

    async fn run_job(&self, job: &Job, alive: &mut watch::Receiver<bool>) -> TerminalAction {
        let mut retry = RetryState::new(self.max_attempts);

        loop {
            let outcome = self.executor.submit(job).await;

            match self.policy.next(&outcome, &mut retry) {
                Decision::Ack => {
                    info!(job_id = %job.id, device_job_id = outcome.device_job_id.as_deref().unwrap_or("-"), "job succeeded");
                    self.reporter
                        .report(&CallbackReport::for_outcome(job, &outcome))
                        .await;
                    return TerminalAction::Ack;
                }
                Decision::AckFatal => {
                    self.reporter
                        .report(&CallbackReport::for_outcome(job, &outcome))
                        .await;
                    return TerminalAction::AckFatal;
                }
                Decision::Requeue => {
                    // No callback: the job is not finished, another
                    // attempt cycle will pick the message up.
                    return TerminalAction::Requeue;
                }
                Decision::RetryAfter(delay) => {
                    if !self.sleep_while_alive(delay, alive).await {
                        warn!(job_id = %job.id, "connection lost during retry wait, abandoning message");
                        return TerminalAction::Abandon;
                    }
                }
            }
        }
    }

    /// Sleep for `delay`, aborting early if the connection dies.
    ///
    /// Returns false when the wait was aborted.
    async fn sleep_while_alive(
        &self,
        delay: std::time::Duration,
        alive: &mut watch::Receiver<bool>,
    ) -> bool {
        if !*alive.borrow() {
            return false;
        }

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                changed = alive.changed() => {
                    if changed.is_err() || !*alive.borrow() {
                        return false;
                    }
                }
            }
        }
    }
}

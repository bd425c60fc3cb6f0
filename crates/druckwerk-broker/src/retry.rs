// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry policy — maps one submission outcome to exactly one decision.
//
// The in-process retry delay is a fixed sleep, not exponential: device
// readiness changes on human and paper timescales, not network ones.
// When the ceiling is reached the message goes back to the broker instead
// of being dropped.

use std::time::Duration;

use tracing::{debug, info, warn};

use druckwerk_core::types::{JobOutcome, OutcomeStatus, RetryState};

/// What to do with the message after one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Job succeeded — acknowledge the message.
    Ack,
    /// Fatal failure — acknowledge so the broker never redelivers it.
    AckFatal,
    /// Transient failure with attempts remaining — sleep, then resubmit.
    RetryAfter(Duration),
    /// Attempts exhausted — return the message to the broker.
    Requeue,
}

/// Stateless decision table over [`JobOutcome`] and [`RetryState`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Decide the next step and bump the attempt counter on retries.
    pub fn next(&self, outcome: &JobOutcome, state: &mut RetryState) -> Decision {
        match outcome.status {
            OutcomeStatus::Success => Decision::Ack,
            OutcomeStatus::FatalFailure => {
                info!(detail = %outcome.detail, "fatal failure, consuming message");
                Decision::AckFatal
            }
            OutcomeStatus::TransientFailure => {
                if state.exhausted() {
                    warn!(
                        attempts = state.attempts,
                        max = state.max_attempts,
                        "transient attempts exhausted, returning message to broker"
                    );
                    Decision::Requeue
                } else {
                    state.attempts += 1;
                    debug!(
                        attempt = state.attempts,
                        delay_secs = self.delay.as_secs(),
                        detail = %outcome.detail,
                        "scheduling retry"
                    );
                    Decision::RetryAfter(self.delay)
                }
            }
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Readiness gate — bounded wait-and-poll until the device can accept work.
//
// Distinguishes "busy" (jobs draining through the device queue) from
// "blocked" (paper out, door open, paused): a backlog keeps the gate
// waiting, a blocking flag keeps it from ever succeeding, and only the
// overall deadline ends the wait.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::probe::StatusProbe;

/// Bounded poll loop over a [`StatusProbe`].
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    max_wait: Duration,
    poll_interval: Duration,
}

impl ReadinessGate {
    pub fn new(max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            max_wait,
            poll_interval,
        }
    }

    /// Poll until the device is ready or `max_wait` elapses.
    ///
    /// Ready means `can_submit()` and an empty device queue. Returns
    /// immediately on the first ready poll; returns false only at the
    /// deadline.
    pub async fn wait_until_ready<P: StatusProbe>(&self, probe: &P, target: &str) -> bool {
        let deadline = Instant::now() + self.max_wait;

        loop {
            let status = probe.probe(target).await;

            if status.can_submit() && status.jobs_in_queue == 0 {
                debug!(target, "device ready");
                return true;
            }

            if status.jobs_in_queue > 0 && status.can_submit() {
                debug!(
                    target,
                    jobs = status.jobs_in_queue,
                    current = status.current_job_id.as_deref().unwrap_or("-"),
                    "device busy, waiting for queue to drain"
                );
            } else {
                debug!(
                    target,
                    online = status.online,
                    paused = status.paused,
                    paper_out = status.paper_out,
                    door_open = status.door_open,
                    "device blocked, waiting for condition to clear"
                );
            }

            if Instant::now() + self.poll_interval > deadline {
                info!(
                    target,
                    waited_secs = self.max_wait.as_secs(),
                    "device did not become ready in time"
                );
                return false;
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

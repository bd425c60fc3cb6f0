// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device status probe.
//
// Reads printer state from `lpstat -l -p <dest>` (enabled/disabled plus
// alert reasons) and the outstanding queue from `lpstat -o <dest>`. The
// probe never raises: any command failure degrades to "offline" with the
// failure text recorded, so readiness decisions are always total
// functions of a concrete status value.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use druckwerk_core::types::DeviceStatus;

/// Read-only view of device health.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn probe(&self, target: &str) -> DeviceStatus;
}

/// Probe backed by the CUPS status tools.
#[derive(Debug, Clone)]
pub struct CupsProbe {
    timeout: Duration,
}

impl CupsProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn lpstat(&self, args: &[&str]) -> Result<String, String> {
        let result = tokio::time::timeout(
            self.timeout,
            Command::new("lpstat").args(args).output(),
        )
        .await
        .map_err(|_| format!("lpstat timed out after {}s", self.timeout.as_secs()))?
        .map_err(|e| format!("lpstat: {e}"))?;

        if result.status.success() {
            Ok(String::from_utf8_lossy(&result.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            Err(if stderr.is_empty() {
                format!("lpstat exited with {}", result.status)
            } else {
                stderr
            })
        }
    }
}

#[async_trait]
impl StatusProbe for CupsProbe {
    async fn probe(&self, target: &str) -> DeviceStatus {
        let state_output = match self.lpstat(&["-l", "-p", target]).await {
            Ok(out) => out,
            Err(e) => {
                debug!(target, error = %e, "status probe degraded");
                return DeviceStatus::unreachable(e);
            }
        };

        let mut status = parse_printer_state(&state_output);

        match self.lpstat(&["-o", target]).await {
            Ok(listing) => {
                let (count, current) = parse_queue_listing(&listing);
                status.jobs_in_queue = count;
                status.current_job_id = current;
            }
            Err(e) => {
                debug!(target, error = %e, "queue listing probe degraded");
                status.online = false;
                status.errors.push(e);
            }
        }

        status
    }
}

/// Parse `lpstat -l -p` output into status flags.
///
/// The first line reads "printer <name> is idle. enabled since ..." or
/// "printer <name> disabled since ..."; alert reasons appear on an
/// indented "Alerts:" line (e.g. "media-empty-error, door-open").
fn parse_printer_state(output: &str) -> DeviceStatus {
    let lower = output.to_ascii_lowercase();

    let mut status = DeviceStatus {
        online: true,
        ..DeviceStatus::default()
    };

    if lower.contains("disabled") || lower.contains("paused") {
        status.paused = true;
    }
    if lower.contains("media-empty") || lower.contains("paper-empty") {
        status.paper_out = true;
    }
    if lower.contains("door-open") || lower.contains("cover-open") {
        status.door_open = true;
    }
    if lower.contains("toner") || lower.contains("marker-supply") {
        status.toner_low = true;
    }
    if lower.contains("offline") {
        status.online = false;
        status.errors.push("printer reported offline".into());
    }

    status
}

/// Parse `lpstat -o` output into (queue depth, current job id).
///
/// One job per line, device job id first: "OfficePrinter-123 alice 1024 ...".
fn parse_queue_listing(output: &str) -> (u32, Option<String>) {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());

    let current = lines
        .clone()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .map(String::from);

    (lines.count() as u32, current)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS command-line driver (`lp` / `lpstat`).
//
// Every invocation is bounded by a timeout and every failure surfaces as
// raw text — the classifier is the only component that interprets it.
// Typical `lp` success output: "request id is OfficePrinter-123 (1 file(s))".

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// Driver-level interface to the print subsystem.
///
/// All errors are raw CLI text destined for the classifier.
#[async_trait]
pub trait PrintDriver: Send + Sync {
    /// Check that the destination is configured in the print subsystem.
    async fn destination_exists(&self, printer: &str) -> Result<(), String>;

    /// Submit a spooled file; returns the device-native job id.
    async fn submit_file(&self, printer: &str, path: &Path) -> Result<String, String>;

    /// Raw listing of not-yet-completed jobs for the destination.
    async fn active_jobs(&self, printer: &str) -> Result<String, String>;
}

/// Production driver shelling out to the CUPS tools.
#[derive(Debug, Clone)]
pub struct CupsDriver {
    /// Timeout applied to each individual CLI invocation.
    timeout: Duration,
}

impl CupsDriver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run one CLI command, bounded by the driver timeout.
    ///
    /// A non-zero exit maps to the command's stderr (falling back to
    /// stdout); spawn failures and timeouts map to descriptive text. The
    /// timeout text deliberately contains "timed out" so the classifier
    /// treats it as transient.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output, String> {
        debug!(program, ?args, "running print subsystem command");

        let result = tokio::time::timeout(
            self.timeout,
            Command::new(program).args(args).output(),
        )
        .await
        .map_err(|_| format!("{program} timed out after {}s", self.timeout.as_secs()))?
        .map_err(|e| format!("{program}: {e}"))?;

        if result.status.success() {
            Ok(result)
        } else {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            if stderr.is_empty() {
                let stdout = String::from_utf8_lossy(&result.stdout).trim().to_string();
                Err(format!("{program} exited with {}: {stdout}", result.status))
            } else {
                Err(stderr)
            }
        }
    }
}

#[async_trait]
impl PrintDriver for CupsDriver {
    async fn destination_exists(&self, printer: &str) -> Result<(), String> {
        // lpstat fails with "Invalid destination name" for unknown printers.
        self.run("lpstat", &["-p", printer]).await.map(|_| ())
    }

    async fn submit_file(&self, printer: &str, path: &Path) -> Result<String, String> {
        let path_str = path
            .to_str()
            .ok_or_else(|| format!("spool path is not valid UTF-8: {}", path.display()))?;

        let output = self
            .run("lp", &["-d", printer, "-o", "media=A4", path_str])
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = parse_request_id(&stdout)
            .ok_or_else(|| format!("could not parse job id from lp output: {}", stdout.trim()))?;

        info!(printer, job_id = %job_id, "job handed to print subsystem");
        Ok(job_id)
    }

    async fn active_jobs(&self, printer: &str) -> Result<String, String> {
        let output = self
            .run("lpstat", &["-W", "not-completed", "-o", printer])
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extract the job id from `lp` output.
///
/// The line has the fixed shape "request id is <printer-NNN> (1 file(s))";
/// the id is the fourth whitespace-separated token.
fn parse_request_id(stdout: &str) -> Option<String> {
    let mut tokens = stdout.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some("request"), Some("id"), Some("is"), Some(id)) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_lp_output() {
        let out = "request id is OfficePrinter-123 (1 file(s))\n";
        assert_eq!(parse_request_id(out).as_deref(), Some("OfficePrinter-123"));
    }

    #[test]
    fn parses_id_with_dashes_in_printer_name() {
        let out = "request id is floor-2-laser-9 (1 file(s))";
        assert_eq!(parse_request_id(out).as_deref(), Some("floor-2-laser-9"));
    }

    #[test]
    fn rejects_unexpected_output() {
        assert!(parse_request_id("").is_none());
        assert!(parse_request_id("lp: Error - no default destination").is_none());
        assert!(parse_request_id("request id").is_none());
    }
}

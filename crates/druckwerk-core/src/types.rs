// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Druckwerk print worker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport used to hand the document to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMethod {
    /// Submit through the CUPS command-line subsystem (`lp` / `lpstat`).
    Cups,
    /// Stream bytes straight to the device on TCP port 9100.
    Raw,
}

impl PrintMethod {
    /// Parse the configured method name ("cups" / "raw").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cups" => Some(Self::Cups),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }
}

/// One task message as it arrives from the queue.
///
/// Every field is optional on the wire; [`Job`] is the resolved form after
/// defaults are applied. `content` is the base64-encoded document payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintTask {
    pub job_id: Option<String>,
    pub printer: Option<String>,
    pub filename: Option<String>,
    pub content: Option<String>,
    pub method: Option<PrintMethod>,
}

/// A resolved unit of work extracted from one queue message.
///
/// Immutable once built; dropped when a terminal decision has been reached
/// for its message.
#[derive(Debug, Clone)]
pub struct Job {
    /// Caller-supplied id, or a generated UUID when the message had none.
    pub id: String,
    /// Destination device (CUPS queue name, or host for raw printing).
    pub printer: String,
    /// Spool filename, carrying the document extension.
    pub filename: String,
    /// Decoded document bytes.
    pub payload: Vec<u8>,
    pub method: PrintMethod,
}

/// A snapshot of device health as reported by the print subsystem.
///
/// `can_submit` is always derived from the flags below — never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub online: bool,
    pub paused: bool,
    pub paper_out: bool,
    pub door_open: bool,
    pub toner_low: bool,
    /// Outstanding jobs on the device side.
    pub jobs_in_queue: u32,
    /// Device-native id of the job currently printing, if any.
    pub current_job_id: Option<String>,
    /// Raw probe failure text, populated when the probe degraded.
    pub errors: Vec<String>,
}

impl DeviceStatus {
    /// Whether the device can accept a new submission right now.
    pub fn can_submit(&self) -> bool {
        self.online && !self.paused && !self.paper_out && !self.door_open
    }

    /// Status with every flag clear except `online` — a healthy idle device.
    pub fn ready() -> Self {
        Self {
            online: true,
            ..Self::default()
        }
    }

    /// Degraded status returned when the probe itself failed.
    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            online: false,
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// Classification of a raw driver error for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Temporary device state — expected to resolve without intervention.
    Transient,
    /// Will not resolve by retrying — configuration or input defect.
    Fatal,
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    TransientFailure,
    FatalFailure,
}

/// The outcome of a single submission attempt.
///
/// Built through the constructors so that `Success` never carries error
/// text and failures never carry a device job id.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub status: OutcomeStatus,
    /// Device-native submission id, present only on success.
    pub device_job_id: Option<String>,
    /// Human-readable diagnostic; empty on success.
    pub detail: String,
}

impl JobOutcome {
    pub fn success(device_job_id: Option<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            device_job_id,
            detail: String::new(),
        }
    }

    pub fn transient(detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::TransientFailure,
            device_job_id: None,
            detail: detail.into(),
        }
    }

    pub fn fatal(detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::FatalFailure,
            device_job_id: None,
            detail: detail.into(),
        }
    }

    /// Build a failure outcome from raw driver text and its classification.
    pub fn from_classified(class: ErrorClass, detail: impl Into<String>) -> Self {
        match class {
            ErrorClass::Transient => Self::transient(detail),
            ErrorClass::Fatal => Self::fatal(detail),
        }
    }
}

/// Per-message retry counter.
///
/// Created when a message is received, discarded at terminal decision.
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Consecutive transient failures so far.
    pub attempts: u32,
    /// Ceiling after which the message goes back to the broker.
    pub max_attempts: u32,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// Lifecycle of the broker connection owned by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Handshake done, channel open, queue declared.
    Connected,
    /// Consumer registered with prefetch 1; deliveries flowing.
    Consuming,
}

impl ConnectionState {
    /// Whether the broker link is usable for ack/nack traffic.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connected | Self::Consuming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_submit_requires_all_flags_clear() {
        let status = DeviceStatus::ready();
        assert!(status.can_submit());

        let paused = DeviceStatus {
            paused: true,
            ..DeviceStatus::ready()
        };
        assert!(!paused.can_submit());

        let paper_out = DeviceStatus {
            paper_out: true,
            ..DeviceStatus::ready()
        };
        assert!(!paper_out.can_submit());

        let door_open = DeviceStatus {
            door_open: true,
            ..DeviceStatus::ready()
        };
        assert!(!door_open.can_submit());

        assert!(!DeviceStatus::default().can_submit());
    }

    #[test]
    fn can_submit_ignores_queue_depth_and_toner() {
        let busy = DeviceStatus {
            jobs_in_queue: 3,
            toner_low: true,
            ..DeviceStatus::ready()
        };
        assert!(busy.can_submit());
    }

    #[test]
    fn unreachable_probe_is_offline_with_error() {
        let status = DeviceStatus::unreachable("lpstat: command not found");
        assert!(!status.online);
        assert!(!status.can_submit());
        assert_eq!(status.errors.len(), 1);
    }

    #[test]
    fn success_outcome_carries_no_error_text() {
        let outcome = JobOutcome::success(Some("OfficePrinter-42".into()));
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert!(outcome.detail.is_empty());
        assert_eq!(outcome.device_job_id.as_deref(), Some("OfficePrinter-42"));
    }

    #[test]
    fn failure_outcomes_carry_no_device_id() {
        let transient = JobOutcome::transient("device not ready");
        assert!(transient.device_job_id.is_none());

        let fatal = JobOutcome::fatal("unknown destination");
        assert!(fatal.device_job_id.is_none());
    }

    #[test]
    fn retry_state_exhaustion() {
        let mut state = RetryState::new(2);
        assert!(!state.exhausted());
        state.attempts = 2;
        assert!(state.exhausted());
    }

    #[test]
    fn print_method_parse() {
        assert_eq!(PrintMethod::from_name("CUPS"), Some(PrintMethod::Cups));
        assert_eq!(PrintMethod::from_name("raw"), Some(PrintMethod::Raw));
        assert_eq!(PrintMethod::from_name("fax"), None);
    }
}

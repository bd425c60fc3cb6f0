// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk Device — everything that talks to the physical printer: the
// CUPS command-line driver, the raw TCP fallback transport, the status
// probe, the readiness gate, and the submission executor that ties them
// together into one attempt → outcome step.

pub mod classify;
pub mod cups;
pub mod probe;
pub mod raw;
pub mod readiness;
pub mod submit;

pub use classify::classify;
pub use cups::{CupsDriver, PrintDriver};
pub use probe::{CupsProbe, StatusProbe};
pub use readiness::ReadinessGate;
pub use submit::{SubmissionExecutor, Submitter};

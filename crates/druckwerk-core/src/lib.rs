// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — core types, error definitions, configuration, and shared
// worker state used by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod report;
pub mod state;
pub mod types;

pub use config::WorkerConfig;
pub use error::DruckError;
pub use report::{CallbackReport, OutcomeReporter, ReportStatus};
pub use state::{ConnectionStatus, SharedJobState};
pub use types::*;

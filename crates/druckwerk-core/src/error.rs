// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Druckwerk.
//
// Device-level failures deliberately do not appear here: the print
// subsystem's only error channel is free text, which travels as raw
// strings into the classifier and ends up in a `JobOutcome`, never in
// this enum.

use thiserror::Error;

/// Top-level error type for all Druckwerk operations.
#[derive(Debug, Error)]
pub enum DruckError {
    // -- Broker errors --
    #[error("broker connection lost: {0}")]
    ConnectionLost(String),

    #[error("broker error: {0}")]
    Broker(String),

    // -- Startup --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DruckError>;

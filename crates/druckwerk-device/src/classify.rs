// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error classification for retry decisions.
//
// The only error channel the CLI print subsystem gives us is free-text
// stderr, so classification is keyword matching. The default is Fatal:
// indefinite retries happen only for recognised transient patterns.

use druckwerk_core::types::ErrorClass;

/// Substrings that mark an error as transient. Matched case-insensitively.
const TRANSIENT_MARKERS: &[&str] = &[
    "unavailable",
    "busy",
    "timeout",
    "timed out",
    "queue full",
    "queue is full",
    "not ready",
    "connection refused",
    "connection reset",
    "broken pipe",
    "temporarily",
    "try again",
];

/// Classify raw driver error text into Transient or Fatal.
///
/// Pure and stateless; the single authority for transient-vs-fatal in the
/// whole worker. Unknown device names, malformed payloads, and permission
/// failures all fall through to Fatal.
pub fn classify(raw: &str) -> ErrorClass {
    let lower = raw.to_ascii_lowercase();

    if TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk Report — outbound HTTP: the terminal-result callback and the
// periodic worker heartbeat. Delivery failures are logged and swallowed;
// reporting never influences message disposition.

pub mod callback;
pub mod heartbeat;

pub use callback::HttpReporter;
pub use heartbeat::Heartbeat;

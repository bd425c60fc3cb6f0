// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk Broker — owns the AMQP side of the worker: the connection
// supervisor (reconnect state machine with capped backoff), the per-message
// job consumer, and the retry policy that decides each message's fate.

pub mod consumer;
pub mod retry;
pub mod supervisor;

pub use consumer::{JobConsumer, TerminalAction};
pub use retry::{Decision, RetryPolicy};
pub use supervisor::ConnectionSupervisor;

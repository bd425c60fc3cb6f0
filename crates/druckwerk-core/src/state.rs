// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared worker state read across threads.
//
// Two small mutex-guarded slots: the job currently in flight (written by
// the consumer, read by the heartbeat) and the broker connection state
// (written by the supervisor, read by the heartbeat). Locks are held only
// for the copy, never across I/O.

use std::sync::{Arc, Mutex};

use crate::types::ConnectionState;

/// Process-wide record of the job id currently being processed.
#[derive(Debug, Clone, Default)]
pub struct SharedJobState {
    slot: Arc<Mutex<Option<String>>>,
}

impl SharedJobState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a job as in flight. Called at submission start.
    pub fn set(&self, job_id: impl Into<String>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(job_id.into());
        }
    }

    /// Clear the slot. Called at terminal decision.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }

    /// Snapshot of the in-flight job id, if any.
    pub fn current(&self) -> Option<String> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }
}

/// Thread-safe view of the supervisor's connection state machine.
///
/// The supervisor owns the connection; everything else observes it through
/// this handle instead of a process global.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    state: Arc<Mutex<ConnectionState>>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
        }
    }

    pub fn set(&self, state: ConnectionState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }

    pub fn get(&self) -> ConnectionState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or(ConnectionState::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_slot_set_and_clear() {
        let state = SharedJobState::new();
        assert!(state.current().is_none());

        state.set("j1");
        assert_eq!(state.current().as_deref(), Some("j1"));

        state.clear();
        assert!(state.current().is_none());
    }

    #[test]
    fn job_slot_shared_across_clones() {
        let state = SharedJobState::new();
        let view = state.clone();

        state.set("j2");
        assert_eq!(view.current().as_deref(), Some("j2"));
    }

    #[test]
    fn connection_status_roundtrip() {
        let status = ConnectionStatus::new();
        assert_eq!(status.get(), ConnectionState::Disconnected);

        status.set(ConnectionState::Consuming);
        assert_eq!(status.get(), ConnectionState::Consuming);
        assert!(status.get().is_live());
    }
}

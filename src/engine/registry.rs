// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tracks which tasks a single run has dispatched.
///
/// One registry is created per call to `perform_continuous_close` and dropped
/// with it. A task id can be claimed once per run; a second claim is refused
/// even after the first has been released.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    state: Arc<Mutex<RegistryState>>,
}

#[derive(Debug, Default)]
struct RegistryState {
    dispatched: HashSet<String>,
    in_flight: HashSet<String>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `task_id` as dispatched. Returns `false` if this run already
    /// dispatched it.
    pub async fn claim(&self, task_id: &str) -> bool {
        let mut state = self.state.lock().await;
        if !state.dispatched.insert(task_id.to_string()) {
            return false;
        }
        state.in_flight.insert(task_id.to_string());
        true
    }

    pub async fn release(&self, task_id: &str) {
        self.state.lock().await.in_flight.remove(task_id);
    }

    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    pub async fn dispatched_count(&self) -> usize {
        self.state.lock().await.dispatched.len()
    }
}

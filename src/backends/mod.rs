// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator implementations shipped with the engine.
//!
//! The engine only talks to the traits in [`crate::traits`]. This module
//! provides implementations good enough to run a close without a ledger,
//! database or message bus behind it.
//!
//! # Available Backends
//!
//! ## Simulated work
//! [`SimulatedWork`] stands in for every task type. Output is derived from the
//! task type and the period length so repeated runs produce the same numbers.
//! Failures and delays can be injected for demos.
//!
//! ## In-memory status store
//! [`InMemoryPeriodStore`] keeps the latest status per period id.
//!
//! ## Tracing notifier
//! [`TracingNotifier`] turns the completion event into a structured log line.
//!
//! ## Stub Backend (Test-Only)
//! Scripted work functions, recording notifiers and failing stores used by
//! unit and integration tests. Not available outside test builds.
//!
//! # Examples
//!
//! ```rust
//! use period_close::backends::{InMemoryPeriodStore, SimulatedWork, TracingNotifier};
//! use period_close::engine::ClosingEngine;
//! use std::sync::Arc;
//!
//! let work = SimulatedWork::registry(&[], 0.0);
//! let engine = ClosingEngine::new(
//!     work,
//!     Arc::new(InMemoryPeriodStore::new()),
//!     Arc::new(TracingNotifier),
//! );
//! # let _ = engine;
//! ```

pub mod memory;
pub mod notify;
pub mod simulated;
#[cfg(test)]
pub mod stub;

pub use memory::InMemoryPeriodStore;
pub use notify::TracingNotifier;
pub use simulated::SimulatedWork;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic the engine emits is a typed message struct from
//! [`messages`] implementing `Display` plus [`messages::StructuredLog`], so
//! log text lives in one place and each event carries structured fields.
//!
//! # Usage
//!
//! ```rust
//! use period_close::observability::messages::{task::TaskRetryScheduled, StructuredLog};
//! use std::time::Duration;
//!
//! TaskRetryScheduled {
//!     task_id: "accruals",
//!     next_attempt: 2,
//!     delay: Duration::from_secs(2),
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber writing to stderr, filtered by `RUST_LOG`
/// and falling back to `default_directive` when the variable is unset or invalid.
///
/// Safe to call more than once; later calls leave the existing subscriber alone.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already installed, keeping it");
    }
}

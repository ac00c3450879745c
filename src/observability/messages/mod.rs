// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `engine` - close lifecycle, group dispatch, phase transitions
//! * `task` - per-task attempts, retries, timeouts and outcomes
//! * `grouping` - dependency grouping and catalog structure problems

pub mod engine;
pub mod grouping;
pub mod task;

use tracing::Span;

/// A message that knows how to emit itself as a structured tracing event.
pub trait StructuredLog {
    /// Emit the message at its natural level with structured fields.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}

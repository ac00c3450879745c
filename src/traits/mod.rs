// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Contracts the engine consumes from the outside world.

pub mod hooks;
pub mod work;

pub use hooks::{ClosingCompleted, ClosingNotifier, PeriodStatusStore};
pub use work::{TaskWork, WorkContext, WorkOutput, WorkRegistry};

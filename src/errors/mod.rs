// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;
mod work;

pub use config::{ConfigError, ValidationError};
pub use engine::EngineError;
pub use work::{NotifyError, StoreError, WorkError};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod analysis;      // validation, report, performance
pub mod backends;      // collaborator implementations
pub mod catalog;       // period-dependent task table
pub mod config;        // YAML config + task validation
pub mod engine;        // grouping, execution, orchestration
pub mod errors;        // error handling
pub mod models;        // periods, tasks, results, reports
pub mod observability;
pub mod traits;        // collaborator seams

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Months, NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use period_close::backends::simulated::MAX_TIME_SCALE;
use period_close::backends::{InMemoryPeriodStore, SimulatedWork, TracingNotifier};
use period_close::config::{load_and_validate_config, Config};
use period_close::engine::ClosingEngine;
use period_close::models::{ClosingPeriod, PeriodType, TaskType};
use period_close::observability::init_tracing;

/// Run a period close against simulated collaborators and print the result as JSON
#[derive(Parser, Debug)]
#[command(name = "period-close")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Override the log filter (logs go to stderr)")]
struct Cli {
    /// YAML engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Identifier of the period being closed
    #[arg(long, default_value = "current")]
    period_id: String,

    /// Tenant that owns the period
    #[arg(long, default_value = "default")]
    tenant: String,

    /// Period type: daily, monthly, quarterly or yearly
    #[arg(long = "type", default_value = "monthly", value_parser = parse_period_type)]
    period_type: PeriodType,

    /// First day of the period (defaults to the first of the current month)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the period (defaults to one month after start, minus a day)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Make every attempt of this task type fail; repeatable
    #[arg(long = "fail", value_parser = parse_task_type)]
    fail: Vec<TaskType>,

    /// Multiplier applied to estimated durations for simulated work
    #[arg(long, default_value_t = 0.0, value_parser = parse_time_scale)]
    time_scale: f64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_period_type(value: &str) -> Result<PeriodType, String> {
    PeriodType::parse(value).ok_or_else(|| format!("unknown period type '{}'", value))
}

fn parse_task_type(value: &str) -> Result<TaskType, String> {
    TaskType::parse(value).ok_or_else(|| format!("unknown task type '{}'", value))
}

fn parse_time_scale(value: &str) -> Result<f64, String> {
    let scale: f64 = value
        .parse()
        .map_err(|e| format!("invalid time scale '{}': {}", value, e))?;
    if (0.0..=MAX_TIME_SCALE).contains(&scale) {
        Ok(scale)
    } else {
        Err(format!("time scale must be within [0, {}], got {}", MAX_TIME_SCALE, value))
    }
}

fn period_bounds(cli: &Cli) -> Result<(NaiveDate, NaiveDate)> {
    let start = match cli.start {
        Some(start) => start,
        None => {
            let today = Utc::now().date_naive();
            today
                .with_day(1)
                .ok_or_else(|| anyhow!("cannot derive the first day of {}", today))?
        }
    };

    let end = match cli.end {
        Some(end) => end,
        None => start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| anyhow!("cannot derive the end of a period starting {}", start))?,
    };

    if end < start {
        return Err(anyhow!("period end {} is before its start {}", end, start));
    }
    Ok((start, end))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    let config = match &cli.config {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let (start, end) = period_bounds(&cli)?;
    let mut period = ClosingPeriod::open(&cli.period_id, &cli.tenant, start, end, cli.period_type);

    let engine = ClosingEngine::from_config(
        &config,
        SimulatedWork::registry(&cli.fail, cli.time_scale),
        Arc::new(InMemoryPeriodStore::with_periods([&period])),
        Arc::new(TracingNotifier),
    );

    let result = engine
        .perform_continuous_close(&mut period)
        .await
        .context("period close aborted")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

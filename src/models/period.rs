// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of a closing period. Drives which tasks the catalog schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Daily,
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    /// True for every period that ends a month (monthly, quarterly, yearly).
    pub fn is_period_end(&self) -> bool {
        !matches!(self, PeriodType::Daily)
    }

    pub fn parse(name: &str) -> Option<PeriodType> {
        match name.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(PeriodType::Daily),
            "monthly" => Some(PeriodType::Monthly),
            "quarterly" => Some(PeriodType::Quarterly),
            "yearly" | "annual" => Some(PeriodType::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodType::Daily => "daily",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Lifecycle status of a closing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Open,
    SoftClose,
    HardClose,
    Archived,
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodStatus::Open => "open",
            PeriodStatus::SoftClose => "soft-close",
            PeriodStatus::HardClose => "hard-close",
            PeriodStatus::Archived => "archived",
        };
        f.write_str(name)
    }
}

/// A tenant-scoped time window being financially closed.
///
/// Created by whoever triggers the close. The engine only ever touches `status`,
/// and only once at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingPeriod {
    pub id: String,
    pub tenant_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period_type: PeriodType,
    pub status: PeriodStatus,
}

impl ClosingPeriod {
    /// Create an open period.
    pub fn open(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        period_type: PeriodType,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            start_date,
            end_date,
            period_type,
            status: PeriodStatus::Open,
        }
    }

    /// Number of calendar days covered, inclusive of both bounds.
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

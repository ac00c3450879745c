// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::models::{ClosingPeriod, PeriodStatus};
use crate::traits::PeriodStatusStore;

/// Status store backed by a map of period id to latest status.
///
/// A store built with [`InMemoryPeriodStore::with_periods`] only knows the
/// periods it was seeded with and rejects updates for anything else.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPeriodStore {
    statuses: Arc<Mutex<HashMap<String, PeriodStatus>>>,
    strict: bool,
}

impl InMemoryPeriodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_periods<'a>(periods: impl IntoIterator<Item = &'a ClosingPeriod>) -> Self {
        let statuses = periods
            .into_iter()
            .map(|p| (p.id.clone(), p.status))
            .collect();
        Self {
            statuses: Arc::new(Mutex::new(statuses)),
            strict: true,
        }
    }

    pub async fn status_of(&self, period_id: &str) -> Option<PeriodStatus> {
        self.statuses.lock().await.get(period_id).copied()
    }
}

#[async_trait]
impl PeriodStatusStore for InMemoryPeriodStore {
    async fn update_status(
        &self,
        period: &ClosingPeriod,
        new_status: PeriodStatus,
    ) -> Result<(), StoreError> {
        let mut statuses = self.statuses.lock().await;
        if self.strict && !statuses.contains_key(&period.id) {
            return Err(StoreError::PeriodNotFound(period.id.clone()));
        }
        statuses.insert(period.id.clone(), new_status);
        Ok(())
    }
}

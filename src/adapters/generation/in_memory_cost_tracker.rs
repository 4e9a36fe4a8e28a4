//! In-memory cost tracker.
//!
//! Keeps every record for the life of the process. Enough for a single
//! instance; spend is lost on restart.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::ports::{CostRecord, CostSummary, CostTracker, CostTrackerError};

/// In-memory implementation of the `CostTracker` port.
#[derive(Debug, Default)]
pub struct InMemoryCostTracker {
    records: Mutex<Vec<CostRecord>>,
}

impl InMemoryCostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CostRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn records(&self) -> Vec<CostRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl CostTracker for InMemoryCostTracker {
    async fn record(&self, record: CostRecord) -> Result<(), CostTrackerError> {
        self.lock().push(record);
        Ok(())
    }

    async fn summary(&self) -> Result<CostSummary, CostTrackerError> {
        let records = self.lock();
        let mut summary = CostSummary::default();
        for record in records.iter() {
            summary.total_usd += record.cost_usd;
            summary.generations += 1;
            *summary.by_provider.entry(record.provider).or_insert(0.0) += record.cost_usd;
        }
        Ok(summary)
    }
}

//! Per-tier model call counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::types::config::ModelTier;

/// Counts model calls as they are issued.
///
/// Shared through an `Arc` by every orchestrator in a run.
#[derive(Debug, Default)]
pub struct CallCounters {
    fast: AtomicU64,
    smart: AtomicU64,
}

/// Point-in-time copy of [`CallCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallTotals {
    pub fast: u64,
    pub smart: u64,
}

impl CallTotals {
    pub fn total(&self) -> u64 {
        self.fast + self.smart
    }
}

impl CallCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, tier: ModelTier) {
        let counter = match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Smart => &self.smart,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, tier: ModelTier) -> u64 {
        match tier {
            ModelTier::Fast => self.fast.load(Ordering::Relaxed),
            ModelTier::Smart => self.smart.load(Ordering::Relaxed),
        }
    }

    pub fn totals(&self) -> CallTotals {
        CallTotals {
            fast: self.get(ModelTier::Fast),
            smart: self.get(ModelTier::Smart),
        }
    }
}

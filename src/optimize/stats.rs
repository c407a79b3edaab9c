//! Per-run statistics

use serde::Serialize;

/// Counts for one batch; never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Files the optimizer actually ran on
    pub optimized: usize,
    /// Files restored from the cache
    pub from_cache: usize,
    /// Files in the batch
    pub total: usize,
}

impl Stats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_optimized(&mut self) {
        self.optimized += 1;
    }

    pub fn record_cache_hit(&mut self) {
        self.from_cache += 1;
    }

    /// Pretty JSON report
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

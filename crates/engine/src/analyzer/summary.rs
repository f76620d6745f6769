use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bucket::Anomaly;
use super::percentile::DurationStats;
use crate::event::LogLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowRequest {
    pub duration: f64,
    pub request_id: Option<String>,
    pub message: String,
}

/// Final read-only snapshot of a run, consumed by report renderers.
///
/// Count maps are ordered so serialized output is stable between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_requests: u64,
    pub duration_stats: DurationStats,
    pub level_counts: BTreeMap<LogLevel, u64>,
    pub service_counts: BTreeMap<String, u64>,
    pub status_codes: BTreeMap<i32, u64>,
    /// Slowest first
    pub slowest_requests: Vec<SlowRequest>,
    /// Chronological
    pub anomalies: Vec<Anomaly>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl Summary {
    pub fn error_count(&self) -> u64 {
        self.level_counts
            .iter()
            .filter(|(level, _)| level.is_error())
            .map(|(_, count)| count)
            .sum()
    }
}

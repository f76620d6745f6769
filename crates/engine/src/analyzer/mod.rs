//! Analyzer: single-pass aggregation over normalized events.
//!
//! An `Analyzer` accumulates; `finalize` consumes it and hands back a
//! read-only `FinalizedAnalysis`. Feeding events after finalization is
//! therefore impossible rather than undefined.

pub mod bucket;
pub mod percentile;
pub mod stats;
pub mod summary;
pub mod top_k;

use tracing::{debug, info};

use crate::event::{timestamp, LogEvent};

pub use bucket::{detect_anomalies, Anomaly, AnomalyRule, BucketMap, TimeBucket};
pub use percentile::{compute_percentiles, DurationStats};
pub use stats::RunningStats;
pub use summary::{SlowRequest, Summary};
pub use top_k::TopK;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct Analyzer {
    stats: RunningStats,
}

impl Analyzer {
    /// `top_n` bounds how many slow requests are kept.
    pub fn new(top_n: usize) -> Self {
        Self {
            stats: RunningStats::new(top_n),
        }
    }

    pub fn process_event(&mut self, event: &LogEvent) {
        self.stats.record(event);
    }

    /// Fold a partial analyzer (e.g. built from another batch) into this one.
    pub fn merge(&mut self, other: Analyzer) {
        self.stats.merge(other.stats);
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    pub fn compute_percentiles(&self) -> DurationStats {
        compute_percentiles(self.stats.durations())
    }

    pub fn detect_anomalies(&self, rule: &AnomalyRule) -> Vec<Anomaly> {
        detect_anomalies(self.stats.buckets(), rule)
    }

    pub fn finalize(self, rule: AnomalyRule) -> FinalizedAnalysis {
        let percentiles = self.compute_percentiles();
        let anomalies = self.detect_anomalies(&rule);

        info!(
            events = self.stats.total(),
            buckets = self.stats.buckets().len(),
            anomalies = anomalies.len(),
            "Analysis finalized"
        );
        debug!(
            p50 = percentiles.p50,
            p95 = percentiles.p95,
            p99 = percentiles.p99,
            samples = self.stats.durations().len(),
            "Duration percentiles"
        );

        FinalizedAnalysis {
            stats: self.stats,
            rule,
            percentiles,
            anomalies,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

/// Analysis state after finalization. Read-only.
#[derive(Debug, Clone)]
pub struct FinalizedAnalysis {
    stats: RunningStats,
    rule: AnomalyRule,
    percentiles: DurationStats,
    anomalies: Vec<Anomaly>,
}

impl FinalizedAnalysis {
    pub fn percentiles(&self) -> DurationStats {
        self.percentiles
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn rule(&self) -> &AnomalyRule {
        &self.rule
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Build the summary snapshot. Repeated calls return equal values.
    pub fn summary(&self) -> Summary {
        let slowest_requests = self
            .stats
            .slowest
            .sorted_desc()
            .into_iter()
            .map(|(_, request)| request.clone())
            .collect();

        Summary {
            total_requests: self.stats.total,
            duration_stats: self.percentiles,
            level_counts: self.stats.level_counts.clone(),
            service_counts: self.stats.service_counts.clone(),
            status_codes: self.stats.status_codes.clone(),
            slowest_requests,
            anomalies: self.anomalies.clone(),
            start_time: self.stats.start_time.as_ref().map(timestamp::to_iso),
            end_time: self.stats.end_time.as_ref().map(timestamp::to_iso),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogLevel;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
    }

    fn event(ts: DateTime<Utc>, level: LogLevel, duration: Option<f64>) -> LogEvent {
        let mut builder = LogEvent::builder().timestamp(ts).level(level).message("msg");
        if let Some(d) = duration {
            builder = builder.duration_ms(d);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_percentiles() {
        let mut analyzer = Analyzer::default();
        for i in 1..=100 {
            analyzer.process_event(&event(base(), LogLevel::Info, Some(i as f64)));
        }

        let stats = analyzer.compute_percentiles();
        assert_eq!(stats.p50, 51.0);
        assert_eq!(stats.p95, 96.0);
        assert_eq!(stats.p99, 100.0);
    }

    #[test]
    fn test_slowest_requests() {
        let mut analyzer = Analyzer::new(2);
        for d in [10.0, 50.0, 20.0, 100.0, 5.0] {
            analyzer.process_event(&event(base(), LogLevel::Info, Some(d)));
        }

        let summary = analyzer.finalize(AnomalyRule::default()).summary();
        let durations: Vec<f64> = summary.slowest_requests.iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![100.0, 50.0]);
    }

    #[test]
    fn test_slowest_keeps_request_context() {
        let mut analyzer = Analyzer::new(1);
        let slow = LogEvent::builder()
            .timestamp(base())
            .message("GET /slow")
            .request_id("req-9")
            .duration_ms(900.0)
            .build()
            .unwrap();
        analyzer.process_event(&event(base(), LogLevel::Info, Some(1.0)));
        analyzer.process_event(&slow);

        let summary = analyzer.finalize(AnomalyRule::default()).summary();
        assert_eq!(
            summary.slowest_requests,
            vec![SlowRequest {
                duration: 900.0,
                request_id: Some("req-9".into()),
                message: "GET /slow".into(),
            }]
        );
    }

    #[test]
    fn test_counts_and_time_range() {
        let mut analyzer = Analyzer::default();
        let later = base() + Duration::minutes(3);
        let earlier = base() - Duration::seconds(30);

        analyzer.process_event(&event(base(), LogLevel::Info, None));
        analyzer.process_event(&event(later, LogLevel::Error, Some(5.0)));
        analyzer.process_event(&event(earlier, LogLevel::Warn, None));
        let with_status = LogEvent::builder()
            .timestamp(base())
            .message("m")
            .service("api")
            .status_code(404)
            .build()
            .unwrap();
        analyzer.process_event(&with_status);

        let summary = analyzer.finalize(AnomalyRule::default()).summary();
        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.level_counts[&LogLevel::Info], 1);
        assert_eq!(summary.level_counts[&LogLevel::Unknown], 1);
        assert_eq!(summary.level_counts[&LogLevel::Error], 1);
        assert_eq!(summary.service_counts["unknown"], 3);
        assert_eq!(summary.service_counts["api"], 1);
        assert_eq!(summary.status_codes[&404], 1);
        assert_eq!(summary.start_time.as_deref(), Some("2023-01-01T11:59:30Z"));
        assert_eq!(summary.end_time.as_deref(), Some("2023-01-01T12:03:00Z"));
        assert_eq!(summary.error_count(), 1);
    }

    #[test]
    fn test_buckets_count_only_error_and_fatal() {
        let mut analyzer = Analyzer::default();
        for level in [LogLevel::Error, LogLevel::Fatal, LogLevel::Warn, LogLevel::Info] {
            analyzer.process_event(&event(base() + Duration::seconds(10), level, None));
        }

        let bucket = analyzer.stats().buckets()["2023-01-01 12:00"];
        assert_eq!(bucket, TimeBucket { total: 4, errors: 2 });
    }

    #[test]
    fn test_anomalies_through_finalize() {
        let mut analyzer = Analyzer::default();
        // 12:00 -> 20 requests, 3 errors (15%)
        for i in 0..20 {
            let level = if i < 3 { LogLevel::Error } else { LogLevel::Info };
            analyzer.process_event(&event(base() + Duration::seconds(i), level, None));
        }
        // 12:05 -> 5 requests, all errors, below min_requests
        for i in 0..5 {
            analyzer.process_event(&event(base() + Duration::minutes(5) + Duration::seconds(i), LogLevel::Fatal, None));
        }

        let finalized = analyzer.finalize(AnomalyRule::default());
        assert_eq!(
            finalized.anomalies(),
            &[Anomaly {
                time: "2023-01-01 12:00".into(),
                error_rate: 0.15,
                total: 20,
                errors: 3,
            }]
        );
    }

    #[test]
    fn test_empty_analysis_defaults() {
        let summary = Analyzer::default().finalize(AnomalyRule::default()).summary();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.duration_stats, DurationStats::default());
        assert!(summary.level_counts.is_empty());
        assert!(summary.slowest_requests.is_empty());
        assert!(summary.anomalies.is_empty());
        assert_eq!(summary.start_time, None);
        assert_eq!(summary.end_time, None);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut analyzer = Analyzer::new(3);
        for i in 0..30 {
            let level = if i % 4 == 0 { LogLevel::Error } else { LogLevel::Info };
            analyzer.process_event(&event(base() + Duration::seconds(i * 7), level, Some((i % 11) as f64)));
        }
        let finalized = analyzer.finalize(AnomalyRule::default());
        assert_eq!(finalized.summary(), finalized.summary());
    }

    #[test]
    fn test_merge_equals_single_pass() {
        let events: Vec<LogEvent> = (0..60)
            .map(|i| {
                let level = if i % 5 == 0 { LogLevel::Error } else { LogLevel::Info };
                let ts = base() + Duration::seconds((i * 97) % 300);
                event(ts, level, Some(((i * 31) % 61) as f64))
            })
            .collect();

        let mut single = Analyzer::new(4);
        events.iter().for_each(|e| single.process_event(e));

        let mut left = Analyzer::new(4);
        let mut right = Analyzer::new(4);
        let (a, b) = events.split_at(23);
        a.iter().for_each(|e| left.process_event(e));
        b.iter().for_each(|e| right.process_event(e));
        right.merge(left);

        let expected = single.finalize(AnomalyRule::default()).summary();
        let merged = right.finalize(AnomalyRule::default()).summary();
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_summary_json_shape() {
        let mut analyzer = Analyzer::default();
        analyzer.process_event(&event(base(), LogLevel::Info, Some(12.0)));
        let summary = analyzer.finalize(AnomalyRule::default()).summary();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_requests"], 1);
        assert_eq!(json["duration_stats"]["p50"], 12.0);
        assert_eq!(json["level_counts"]["INFO"], 1);
        assert_eq!(json["slowest_requests"][0]["request_id"], serde_json::Value::Null);
        assert_eq!(json["start_time"], "2023-01-01T12:00:00Z");

        let back: Summary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }
}

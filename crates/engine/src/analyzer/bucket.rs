//! Per-minute request/error counters and error-rate anomaly detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub total: u64,
    pub errors: u64,
}

impl TimeBucket {
    pub fn record(&mut self, is_error: bool) {
        self.total += 1;
        if is_error {
            self.errors += 1;
        }
    }

    pub fn merge(&mut self, other: &TimeBucket) {
        self.total += other.total;
        self.errors += other.errors;
    }

    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.errors as f64 / self.total as f64
    }
}

/// Buckets keyed by `YYYY-MM-DD HH:MM`; keys sort chronologically.
pub type BucketMap = BTreeMap<String, TimeBucket>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRule {
    /// A bucket is anomalous when errors/total is strictly above this
    pub threshold_ratio: f64,
    /// Buckets with fewer requests are never reported
    pub min_requests: u64,
}

impl Default for AnomalyRule {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.1,
            min_requests: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub time: String,
    /// Rounded to two decimals
    pub error_rate: f64,
    pub total: u64,
    pub errors: u64,
}

/// Anomalous buckets in key (chronological) order.
pub fn detect_anomalies(buckets: &BucketMap, rule: &AnomalyRule) -> Vec<Anomaly> {
    buckets
        .iter()
        .filter(|(_, bucket)| bucket.total >= rule.min_requests && bucket.total > 0)
        .filter(|(_, bucket)| bucket.error_rate() > rule.threshold_ratio)
        .map(|(time, bucket)| Anomaly {
            time: time.clone(),
            error_rate: round2(bucket.error_rate()),
            total: bucket.total,
            errors: bucket.errors,
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(total: u64, errors: u64) -> TimeBucket {
        TimeBucket { total, errors }
    }

    #[test]
    fn test_reports_bucket_above_threshold() {
        let mut buckets = BucketMap::new();
        buckets.insert("2023-01-01 12:00".into(), bucket(20, 3));

        let anomalies = detect_anomalies(&buckets, &AnomalyRule::default());
        assert_eq!(
            anomalies,
            vec![Anomaly {
                time: "2023-01-01 12:00".into(),
                error_rate: 0.15,
                total: 20,
                errors: 3,
            }]
        );
    }

    #[test]
    fn test_sparse_bucket_is_ignored() {
        let mut buckets = BucketMap::new();
        buckets.insert("2023-01-01 12:00".into(), bucket(5, 5));
        assert!(detect_anomalies(&buckets, &AnomalyRule::default()).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut buckets = BucketMap::new();
        buckets.insert("2023-01-01 12:00".into(), bucket(10, 1));
        assert!(detect_anomalies(&buckets, &AnomalyRule::default()).is_empty());

        buckets.insert("2023-01-01 12:01".into(), bucket(10, 2));
        let anomalies = detect_anomalies(&buckets, &AnomalyRule::default());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].time, "2023-01-01 12:01");
    }

    #[test]
    fn test_output_is_chronological() {
        let mut buckets = BucketMap::new();
        buckets.insert("2023-01-02 00:00".into(), bucket(10, 5));
        buckets.insert("2023-01-01 23:59".into(), bucket(10, 5));
        buckets.insert("2023-01-01 08:15".into(), bucket(10, 5));

        let times: Vec<_> = detect_anomalies(&buckets, &AnomalyRule::default())
            .into_iter()
            .map(|a| a.time)
            .collect();
        assert_eq!(times, vec!["2023-01-01 08:15", "2023-01-01 23:59", "2023-01-02 00:00"]);
    }

    #[test]
    fn test_custom_rule_and_rounding() {
        let mut buckets = BucketMap::new();
        buckets.insert("2023-01-01 12:00".into(), bucket(3, 1));

        let rule = AnomalyRule {
            threshold_ratio: 0.3,
            min_requests: 3,
        };
        let anomalies = detect_anomalies(&buckets, &rule);
        assert_eq!(anomalies[0].error_rate, 0.33);
    }

    #[test]
    fn test_zero_min_requests_skips_empty_buckets() {
        let mut buckets = BucketMap::new();
        buckets.insert("2023-01-01 12:00".into(), bucket(0, 0));
        let rule = AnomalyRule {
            threshold_ratio: -1.0,
            min_requests: 0,
        };
        assert!(detect_anomalies(&buckets, &rule).is_empty());
    }

    #[test]
    fn test_bucket_merge() {
        let mut a = bucket(4, 1);
        a.merge(&bucket(6, 2));
        assert_eq!(a, bucket(10, 3));
        a.record(true);
        a.record(false);
        assert_eq!(a, bucket(12, 4));
    }
}

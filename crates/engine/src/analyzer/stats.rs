use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::bucket::BucketMap;
use super::summary::SlowRequest;
use super::top_k::TopK;
use crate::event::{timestamp, LogEvent, LogLevel};

/// Running aggregates for one analysis run.
///
/// Every duration is retained so percentiles are exact. Only the top-K
/// slow requests keep their request id and message.
#[derive(Debug, Clone)]
pub struct RunningStats {
    pub(crate) total: u64,
    pub(crate) level_counts: BTreeMap<LogLevel, u64>,
    pub(crate) service_counts: BTreeMap<String, u64>,
    pub(crate) status_codes: BTreeMap<i32, u64>,
    pub(crate) durations: Vec<f64>,
    pub(crate) slowest: TopK<SlowRequest>,
    pub(crate) start_time: Option<DateTime<Utc>>,
    pub(crate) end_time: Option<DateTime<Utc>>,
    pub(crate) buckets: BucketMap,
}

impl RunningStats {
    pub fn new(top_n: usize) -> Self {
        Self {
            total: 0,
            level_counts: BTreeMap::new(),
            service_counts: BTreeMap::new(),
            status_codes: BTreeMap::new(),
            durations: Vec::new(),
            slowest: TopK::new(top_n),
            start_time: None,
            end_time: None,
            buckets: BucketMap::new(),
        }
    }

    pub fn record(&mut self, event: &LogEvent) {
        self.total += 1;
        *self.level_counts.entry(event.level).or_insert(0) += 1;
        // avoid allocating a key for services we've already seen
        match self.service_counts.get_mut(event.service.as_str()) {
            Some(count) => *count += 1,
            None => {
                self.service_counts.insert(event.service.clone(), 1);
            }
        }
        if let Some(code) = event.status_code {
            *self.status_codes.entry(code).or_insert(0) += 1;
        }

        if let Some(duration) = event.duration_ms {
            self.durations.push(duration);
            self.slowest.offer_with(duration, || SlowRequest {
                duration,
                request_id: event.request_id.clone(),
                message: event.message.clone(),
            });
        }

        self.observe_time(event.timestamp);

        self.buckets
            .entry(timestamp::minute_key(&event.timestamp))
            .or_default()
            .record(event.level.is_error());
    }

    fn observe_time(&mut self, ts: DateTime<Utc>) {
        if self.start_time.map_or(true, |start| ts < start) {
            self.start_time = Some(ts);
        }
        if self.end_time.map_or(true, |end| ts > end) {
            self.end_time = Some(ts);
        }
    }

    pub fn merge(&mut self, other: RunningStats) {
        self.total += other.total;
        for (level, count) in other.level_counts {
            *self.level_counts.entry(level).or_insert(0) += count;
        }
        for (service, count) in other.service_counts {
            *self.service_counts.entry(service).or_insert(0) += count;
        }
        for (code, count) in other.status_codes {
            *self.status_codes.entry(code).or_insert(0) += count;
        }
        self.durations.extend(other.durations);
        self.slowest.merge(other.slowest);
        if let Some(start) = other.start_time {
            self.observe_time(start);
        }
        if let Some(end) = other.end_time {
            self.observe_time(end);
        }
        for (key, bucket) in other.buckets {
            self.buckets.entry(key).or_default().merge(&bucket);
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn buckets(&self) -> &BucketMap {
        &self.buckets
    }

    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.start_time.zip(self.end_time)
    }
}

use std::fmt::Write as _;
use std::time::Duration;

use engine::parser::ParseMetrics;
use engine::Summary;

/// Human-readable run summary for stdout.
pub fn render(summary: &Summary, metrics: &ParseMetrics, failed: usize, elapsed: Duration) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, summary, metrics, failed, elapsed);
    out
}

fn write_report(
    out: &mut String,
    summary: &Summary,
    metrics: &ParseMetrics,
    failed: usize,
    elapsed: Duration,
) -> std::fmt::Result {
    writeln!(out, "Processing took {:.2}s", elapsed.as_secs_f64())?;
    writeln!(out, "Total requests: {}", summary.total_requests)?;
    writeln!(out, "Errors (ERROR/FATAL): {}", summary.error_count())?;
    writeln!(out, "Failed lines: {}", failed)?;
    writeln!(
        out,
        "Parsed: json={} text={}",
        metrics.formats.json, metrics.formats.text
    )?;
    if let (Some(start), Some(end)) = (&summary.start_time, &summary.end_time) {
        writeln!(out, "Time range: {} .. {}", start, end)?;
    }

    writeln!(out)?;
    writeln!(out, "Latency (ms)")?;
    writeln!(out, "  {:<6}{:>12}", "p50", format!("{:.2}", summary.duration_stats.p50))?;
    writeln!(out, "  {:<6}{:>12}", "p95", format!("{:.2}", summary.duration_stats.p95))?;
    writeln!(out, "  {:<6}{:>12}", "p99", format!("{:.2}", summary.duration_stats.p99))?;

    if !summary.status_codes.is_empty() {
        writeln!(out)?;
        writeln!(out, "Status codes")?;
        for (code, count) in &summary.status_codes {
            writeln!(out, "  {:<6}{:>12}", code, count)?;
        }
    }

    if !summary.slowest_requests.is_empty() {
        writeln!(out)?;
        writeln!(out, "Slowest requests")?;
        for request in &summary.slowest_requests {
            writeln!(
                out,
                "  {:>10.2}  {:<20}  {}",
                request.duration,
                request.request_id.as_deref().unwrap_or("-"),
                request.message
            )?;
        }
    }

    writeln!(out)?;
    if summary.anomalies.is_empty() {
        writeln!(out, "No error-rate anomalies")?;
    } else {
        writeln!(out, "Error-rate anomalies")?;
        for anomaly in &summary.anomalies {
            writeln!(
                out,
                "  {}  rate={:.2}  errors={}/{}",
                anomaly.time, anomaly.error_rate, anomaly.errors, anomaly.total
            )?;
        }
    }

    Ok(())
}

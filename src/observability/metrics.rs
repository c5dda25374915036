//! Metrics collection and reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of the gateway counters
#[derive(Debug, Clone)]
pub struct SystemMetrics {
    /// Identification requests handled
    pub total_requests: u64,

    /// Requests rejected by input validation
    pub rejected_requests: u64,

    /// Requests that ended in a server error
    pub total_errors: u64,

    /// Failed upstream calls
    pub upstream_failures: u64,

    /// Average response time (ms)
    pub avg_response_time_ms: f64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Latency histogram buckets (in milliseconds); completions with images are slow
const LATENCY_BUCKETS: &[f64] = &[50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0];

/// Histogram for tracking latency distribution
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: Vec<(f64, Arc<AtomicU64>)>,
    sum: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    fn new(buckets: &[f64]) -> Self {
        let bucket_counters = buckets
            .iter()
            .map(|&b| (b, Arc::new(AtomicU64::new(0))))
            .collect();

        Self {
            buckets: bucket_counters,
            sum: Arc::new(AtomicU64::new(0)),
            count: Arc::new(AtomicU64::new(0)),
        }
    }

    fn observe(&self, value: f64) {
        self.sum.fetch_add(value as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        // Cumulative: every bucket >= value is incremented
        for (bucket, counter) in &self.buckets {
            if value <= *bucket {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn export_prometheus(&self, name: &str, help: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} histogram\n", name));

        for (bucket, counter) in &self.buckets {
            let count = counter.load(Ordering::Relaxed);
            output.push_str(&format!("{}_bucket{{le=\"{}\"}} {}\n", name, bucket, count));
        }

        let total_count = self.count();
        output.push_str(&format!("{}_bucket{{le=\"+Inf\"}} {}\n", name, total_count));

        let sum = self.sum.load(Ordering::Relaxed) as f64;
        output.push_str(&format!("{}_sum {:.3}\n", name, sum));
        output.push_str(&format!("{}_count {}\n", name, total_count));

        output
    }
}

/// Lock-free request counters shared across handlers
pub struct MetricsCollector {
    start_time: Instant,
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
    total_errors: AtomicU64,
    upstream_failures: AtomicU64,
    total_response_time_ms: AtomicU64,
    request_latency: Histogram,
    upstream_latency: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            total_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            upstream_failures: AtomicU64::new(0),
            total_response_time_ms: AtomicU64::new(0),
            request_latency: Histogram::new(LATENCY_BUCKETS),
            upstream_latency: Histogram::new(LATENCY_BUCKETS),
        }
    }

    /// Record a handled request
    pub fn record_request(&self, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let ms = response_time.as_millis() as u64;
        self.total_response_time_ms.fetch_add(ms, Ordering::Relaxed);
        self.request_latency.observe(ms as f64);
    }

    /// Record a request rejected by input validation
    pub fn record_rejected(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that ended in a server error
    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed upstream call
    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long one upstream call took
    pub fn record_upstream_latency(&self, duration: Duration) {
        self.upstream_latency.observe(duration.as_millis() as f64);
    }

    /// Number of upstream calls observed so far
    pub fn upstream_calls(&self) -> u64 {
        self.upstream_latency.count()
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> SystemMetrics {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time_ms.load(Ordering::Relaxed);

        let avg_response_time_ms = if total_requests > 0 {
            total_response_time as f64 / total_requests as f64
        } else {
            0.0
        };

        SystemMetrics {
            total_requests,
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            total_errors: self.total_errors.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            avg_response_time_ms,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let metrics = self.get_metrics();

        let mut output = format!(
            "# HELP grocery_identifier_requests_total Identification requests handled\n\
             # TYPE grocery_identifier_requests_total counter\n\
             grocery_identifier_requests_total {}\n\
             \n\
             # HELP grocery_identifier_rejected_total Requests rejected by input validation\n\
             # TYPE grocery_identifier_rejected_total counter\n\
             grocery_identifier_rejected_total {}\n\
             \n\
             # HELP grocery_identifier_errors_total Requests that ended in a server error\n\
             # TYPE grocery_identifier_errors_total counter\n\
             grocery_identifier_errors_total {}\n\
             \n\
             # HELP grocery_identifier_upstream_failures_total Failed completion API calls\n\
             # TYPE grocery_identifier_upstream_failures_total counter\n\
             grocery_identifier_upstream_failures_total {}\n\
             \n\
             # HELP grocery_identifier_avg_response_time_ms Average response time in milliseconds\n\
             # TYPE grocery_identifier_avg_response_time_ms gauge\n\
             grocery_identifier_avg_response_time_ms {:.2}\n\
             \n\
             # HELP grocery_identifier_uptime_seconds Uptime in seconds\n\
             # TYPE grocery_identifier_uptime_seconds counter\n\
             grocery_identifier_uptime_seconds {}\n\n",
            metrics.total_requests,
            metrics.rejected_requests,
            metrics.total_errors,
            metrics.upstream_failures,
            metrics.avg_response_time_ms,
            metrics.uptime_secs,
        );

        output.push_str(&self.request_latency.export_prometheus(
            "grocery_identifier_request_duration_ms",
            "Identification request latency in milliseconds",
        ));
        output.push('\n');
        output.push_str(&self.upstream_latency.export_prometheus(
            "grocery_identifier_upstream_duration_ms",
            "Completion API latency in milliseconds",
        ));

        output
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

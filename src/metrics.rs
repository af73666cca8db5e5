use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Histogram, TextEncoder, register_counter, register_histogram,
};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: Counter =
        register_counter!("pylearn_submissions_total", "Total code submissions").unwrap();
    pub static ref BLOCKED_INVALID: Counter = register_counter!(
        "pylearn_blocked_invalid_total",
        "Submissions rejected by the keyword/length check"
    )
    .unwrap();
    pub static ref BLOCKED_RATE_LIMITED: Counter = register_counter!(
        "pylearn_blocked_rate_limited_total",
        "Submissions rejected by the local rate limiter"
    )
    .unwrap();
    pub static ref EXEC_TIMEOUTS: Counter =
        register_counter!("pylearn_exec_timeouts_total", "Executions that hit the timeout").unwrap();
    pub static ref EXEC_FAILURES: Counter =
        register_counter!("pylearn_exec_failures_total", "Executions that failed remotely").unwrap();
    pub static ref EXEC_LATENCY: Histogram = register_histogram!(
        "pylearn_exec_latency_seconds",
        "Round trip of /run_code in seconds"
    )
    .unwrap();
    pub static ref CHAT_REQUESTS: Counter =
        register_counter!("pylearn_chat_requests_total", "Total chat messages sent").unwrap();
    pub static ref CHAT_FAILURES: Counter =
        register_counter!("pylearn_chat_failures_total", "Chat exchanges ending in an error").unwrap();
}

pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# failed to encode metrics: {}\n", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

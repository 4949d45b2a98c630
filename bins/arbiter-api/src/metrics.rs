/// Prometheus metrics for judge runs
///
/// Outcomes: `passed`, `failed`, `security`, `compilation`.
use arbiter_common::types::ExecutionResult;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use std::time::Duration;

lazy_static! {
    static ref JUDGE_RUNS: IntCounterVec = register_int_counter_vec!(
        "arbiter_judge_runs_total",
        "Judge runs by outcome",
        &["outcome"]
    )
    .unwrap();
    static ref JUDGE_DURATION: Histogram = register_histogram!(
        "arbiter_judge_duration_seconds",
        "Wall time of one judge run",
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .unwrap();
}

pub fn outcome(result: &ExecutionResult) -> &'static str {
    match result.error.as_deref() {
        Some(e) if e.starts_with("Security violation") => "security",
        Some(e) if e.starts_with("Compilation error") => "compilation",
        _ if result.success => "passed",
        _ => "failed",
    }
}

pub fn record(result: &ExecutionResult, elapsed: Duration) {
    JUDGE_RUNS.with_label_values(&[outcome(result)]).inc();
    JUDGE_DURATION.observe(elapsed.as_secs_f64());
}

/// Text exposition of every registered metric
pub fn render() -> anyhow::Result<String> {
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let security = ExecutionResult::aborted("Security violation: Forbidden API detected: ProcessBuilder", 1);
        let compilation = ExecutionResult::aborted("Compilation error: Line 1: ';' expected", 1);
        let empty = ExecutionResult::from_results(Vec::new(), 1);

        assert_eq!(outcome(&security), "security");
        assert_eq!(outcome(&compilation), "compilation");
        assert_eq!(outcome(&empty), "failed");
    }

    #[test]
    fn test_recorded_runs_are_rendered() {
        record(&ExecutionResult::aborted("Compilation error: x", 1), Duration::from_millis(30));
        let text = render().unwrap();
        assert!(text.contains("arbiter_judge_runs_total{outcome=\"compilation\"}"));
        assert!(text.contains("arbiter_judge_duration_seconds_bucket"));
    }
}

//! PromQL expressions for the wrk2 benchmark metrics and the names of the
//! summary series derived from them.

use crate::model::{Mesh, Resolution, Run};

pub const PROGRESS_METRIC: &str = "wrk2_benchmark_progress";
pub const REQUESTED_RPS_METRIC: &str = "wrk2_benchmark_run_requested_rps";
pub const LATENCY_METRIC: &str = "wrk2_benchmark_latency_ms";
pub const LATENCY_DETAILED_METRIC: &str = "wrk2_benchmark_latency_detailed_ms";

pub const SUMMARY_METRIC: &str = "wrk2_benchmark_summary_latency_ms";
pub const SUMMARY_DETAILED_METRIC: &str = "wrk2_benchmark_summary_latency_detailed_ms";

pub const RUN_LABEL: &str = "run";
pub const PERCENTILE_LABEL: &str = "p";

pub fn completed_runs(mesh: &Mesh) -> String {
    format!(
        r#"{}{{status="done",exported_job="{}"}}"#,
        PROGRESS_METRIC,
        escape(mesh.as_str())
    )
}

pub fn requested_rps(mesh: &Mesh, run: &Run) -> String {
    format!(
        r#"{}{{run="{}",exported_job="{}"}}"#,
        REQUESTED_RPS_METRIC,
        escape(run.as_str()),
        escape(mesh.as_str())
    )
}

pub fn latency_histogram(run: &Run, resolution: Resolution) -> String {
    format!(
        r#"{}{{run="{}"}}"#,
        latency_metric(resolution),
        escape(run.as_str())
    )
}

pub fn latency_metric(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Coarse => LATENCY_METRIC,
        Resolution::Detailed => LATENCY_DETAILED_METRIC,
    }
}

pub fn summary_metric(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Coarse => SUMMARY_METRIC,
        Resolution::Detailed => SUMMARY_DETAILED_METRIC,
    }
}

/// Escapes a value for use inside a double-quoted PromQL string literal.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str(r#"\""#),
            '\n' => escaped.push_str(r"\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

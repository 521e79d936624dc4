//! Domain logic for reducebench.
//!
//! This crate is intentionally I/O-free: it turns rows and line sets into
//! summaries. Reading `metrics.csv` and capture files is the app layer's job.

pub use reducebench_error::DomainError;
use reducebench_types::{MetricsRow, RunResult, RunStatus, VERIFY_SUCCESS};
use std::collections::BTreeSet;

/// Which row a summary's "final" values were taken from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FinalRow {
    /// Index of the last success row.
    LastSuccess(usize),

    /// No success row exists; the earliest row stands in.
    Fallback(usize),
}

impl FinalRow {
    pub fn index(self) -> usize {
        match self {
            FinalRow::LastSuccess(i) | FinalRow::Fallback(i) => i,
        }
    }

    pub fn status(self) -> RunStatus {
        match self {
            FinalRow::LastSuccess(_) => RunStatus::Success,
            FinalRow::Fallback(_) => RunStatus::Bad,
        }
    }
}

/// Scan rows from the end for the last success judgment.
///
/// When nothing succeeded the scan ends on the first row, and that row is
/// used for the final values.
pub fn select_final(rows: &[MetricsRow]) -> Result<FinalRow, DomainError> {
    if rows.is_empty() {
        return Err(DomainError::NoRows);
    }
    Ok(rows
        .iter()
        .rposition(MetricsRow::is_success)
        .map_or(FinalRow::Fallback(0), FinalRow::LastSuccess))
}

/// Number of sizes the reducer searched past before its first gap.
///
/// The smallest non-negative integer missing from `counts`, minus one,
/// saturated at zero.
pub fn search_count<I>(counts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let hits: BTreeSet<u64> = counts.into_iter().collect();
    let mut hole = 0u64;
    for c in hits {
        if c != hole {
            break;
        }
        hole += 1;
    }
    hole.saturating_sub(1)
}

/// Elapsed time for a run; NaN for timed-out runs.
pub fn elapsed_time(status: RunStatus, final_row: &MetricsRow) -> f64 {
    match status {
        RunStatus::Timeout => f64::NAN,
        RunStatus::Success | RunStatus::Bad => final_row.elapsed(),
    }
}

/// Everything derivable from the metrics table alone.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub final_row: FinalRow,
    pub status: RunStatus,
    pub initial_scc: u64,
    pub scc: u64,
    pub initial_classes: u64,
    pub classes: u64,
    pub initial_bytes: u64,
    pub bytes: u64,
    pub iters: u64,
    pub searches: u64,
    pub setup_time: f64,
    pub time: f64,
    pub flaky: bool,
}

impl MetricsSummary {
    pub fn into_run_result(self, bugs: usize, verify: String) -> RunResult {
        RunResult {
            status: self.status,
            initial_scc: self.initial_scc,
            scc: self.scc,
            initial_classes: self.initial_classes,
            classes: self.classes,
            initial_bytes: self.initial_bytes,
            bytes: self.bytes,
            iters: self.iters,
            searches: self.searches,
            setup_time: self.setup_time,
            time: self.time,
            flaky: self.flaky,
            bugs,
            verify,
        }
    }
}

pub fn summarize_metrics(rows: &[MetricsRow]) -> Result<MetricsSummary, DomainError> {
    let final_row = select_final(rows)?;
    let status = final_row.status();
    let last = &rows[final_row.index()];
    let first = &rows[0];

    Ok(MetricsSummary {
        final_row,
        status,
        initial_scc: first.count,
        scc: last.count,
        initial_classes: first.classes,
        classes: last.classes,
        initial_bytes: first.bytes,
        bytes: last.bytes,
        iters: last.folder,
        searches: search_count(rows.iter().map(|r| r.count)),
        setup_time: first.time,
        time: elapsed_time(status, last),
        flaky: !first.is_success(),
    })
}

/// Stdout lines captured at one reduction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Name of the directory directly containing the capture.
    pub stage: String,
    pub lines: BTreeSet<String>,
}

/// True when `found` lost at least one of the `baseline` bugs.
pub fn is_regression(baseline: &BTreeSet<String>, found: &BTreeSet<String>) -> bool {
    !found.is_superset(baseline)
}

/// Check captures in order and name the first stage that lost a bug.
///
/// Stops pulling from `captures` at the first regression, so callers can
/// read capture files lazily. Errors from the iterator propagate.
pub fn verify_captures<I, E>(baseline: &BTreeSet<String>, captures: I) -> Result<String, E>
where
    I: IntoIterator<Item = Result<Capture, E>>,
{
    for capture in captures {
        let capture = capture?;
        if is_regression(baseline, &capture.lines) {
            return Ok(capture.stage);
        }
    }
    Ok(VERIFY_SUCCESS.to_string())
}

/// Final-size ratio of the new strategy against the baseline.
pub fn size_ratio(baseline_bytes: u64, new_bytes: u64) -> Result<f64, DomainError> {
    if baseline_bytes == 0 {
        return Err(DomainError::ZeroBaselineBytes);
    }
    Ok(new_bytes as f64 / baseline_bytes as f64)
}

/// Render a ratio cell as the shortest round-trip decimal.
///
/// Positional for exponents in `-4..16` (whole numbers keep a trailing
/// `.0`), otherwise scientific with a signed two-digit exponent: `0.25`,
/// `1.0`, `1e-05`, `2.5e+16`.
pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_nan() {
        return "nan".to_string();
    }
    if ratio.is_infinite() {
        return if ratio > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `2.5e-1`.
    let sci = format!("{:e}", ratio.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if ratio.is_sign_negative() { "-" } else { "" };

    if !(-4..16).contains(&exp) {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs());
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let body = if exp < 0 {
        format!("0.{}{digits}", "0".repeat((-exp - 1) as usize))
    } else {
        let point = exp as usize + 1;
        if digits.len() <= point {
            format!("{digits}{}.0", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

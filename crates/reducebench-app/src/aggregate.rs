//! Aggregating one reducer workfolder into a `RunResult`.

use reducebench_adapters::{
    CAPTURE_FILE, INITIAL_DIR, capture_paths, read_capture_lines, read_metrics_table,
};
use reducebench_domain::{Capture, FinalRow, summarize_metrics, verify_captures};
use reducebench_error::AggregateError;
use reducebench_types::{METRICS_FILE, RunResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Read `metrics.csv` and the stdout captures under `workfolder`.
///
/// Any missing or malformed file is an error; the batch loop decides what
/// to do with it.
pub fn read_benchmark(workfolder: &Path) -> Result<RunResult, AggregateError> {
    let rows = read_metrics_table(&workfolder.join(METRICS_FILE))?;
    let summary = summarize_metrics(&rows)?;

    if let FinalRow::Fallback(i) = summary.final_row {
        tracing::warn!(
            workfolder = %workfolder.display(),
            row = i,
            "no successful iteration; final values taken from the earliest row"
        );
    }

    let initial = read_capture_lines(&workfolder.join(INITIAL_DIR).join(CAPTURE_FILE))?;
    let bugs = initial.len();
    let baseline: BTreeSet<String> = initial.into_iter().collect();

    let read_capture = |path: PathBuf| -> Result<Capture, AggregateError> {
        let lines = read_capture_lines(&path)?;
        let stage = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Capture {
            stage,
            lines: lines.into_iter().collect(),
        })
    };
    let captures = capture_paths(workfolder)?.into_iter().map(read_capture);
    let verify = verify_captures(&baseline, captures)?;

    Ok(summary.into_run_result(bugs, verify))
}

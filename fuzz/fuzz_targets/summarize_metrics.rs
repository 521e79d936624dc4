//! Structure-aware fuzzing of the metrics summary.
//!
//! Any non-empty table must summarize without panicking, and the search
//! count can never exceed the number of rows.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reducebench_types::MetricsRow;

fuzz_target!(|rows: Vec<MetricsRow>| {
    let Ok(summary) = reducebench_domain::summarize_metrics(&rows) else {
        assert!(rows.is_empty());
        return;
    };

    let result = summary.into_run_result(0, String::new());
    assert!(result.searches <= rows.len() as u64);
    assert_eq!(result.flaky, !rows[0].is_success());
    assert_eq!(result.initial_bytes, rows[0].bytes);
});

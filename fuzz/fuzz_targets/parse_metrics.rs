//! Feed arbitrary bytes through the metrics table reader and the summary.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reducebench_types::MetricsRow;

fuzz_target!(|data: &[u8]| {
    let mut rdr = csv::Reader::from_reader(data);
    let rows: Result<Vec<MetricsRow>, _> = rdr.deserialize().collect();
    if let Ok(rows) = rows {
        match reducebench_domain::summarize_metrics(&rows) {
            Ok(summary) => assert!(summary.final_row.index() < rows.len()),
            Err(_) => assert!(rows.is_empty()),
        }
    }
});

//! Readers for the files a reducer run leaves in its workfolder.

use reducebench_error::AggregateError;
use reducebench_types::MetricsRow;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory holding the capture of the unreduced input.
pub const INITIAL_DIR: &str = "initial";

/// File name of every stdout capture.
pub const CAPTURE_FILE: &str = "stdout";

pub fn read_metrics_table(path: &Path) -> Result<Vec<MetricsRow>, AggregateError> {
    let file = fs::File::open(path).map_err(|source| AggregateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = csv::Reader::from_reader(file)
        .deserialize()
        .collect::<Result<Vec<MetricsRow>, _>>()
        .map_err(|source| AggregateError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    if rows.is_empty() {
        return Err(AggregateError::EmptyMetrics {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

/// Lines of a newline-delimited capture file.
pub fn read_capture_lines(path: &Path) -> Result<Vec<String>, AggregateError> {
    let text = fs::read_to_string(path).map_err(|source| AggregateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(str::to_string).collect())
}

/// All `<workfolder>/*/*/stdout` captures, in lexical path order.
///
/// Dot-named stage directories are included.
pub fn capture_paths(workfolder: &Path) -> Result<Vec<PathBuf>, AggregateError> {
    let root = glob::Pattern::escape(&workfolder.to_string_lossy());
    let pattern = format!("{root}/*/*/{CAPTURE_FILE}");
    let entries = glob::glob_with(&pattern, glob::MatchOptions::new()).map_err(|source| {
        AggregateError::Pattern {
            pattern: pattern.clone(),
            source,
        }
    })?;

    let mut paths = entries
        .collect::<Result<Vec<PathBuf>, _>>()
        .map_err(|source| AggregateError::Glob {
            pattern: pattern.clone(),
            source,
        })?;
    paths.sort();
    Ok(paths)
}

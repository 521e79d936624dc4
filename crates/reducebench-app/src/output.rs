//! The CSV table a batch writes its rows to.

use anyhow::Context;
use reducebench_types::{ComparisonPair, OUTPUT_COLUMNS, ResultRow};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output table with the header already written.
///
/// Callers flush after each case so that a crash loses at most the case in
/// flight.
pub struct ResultTable<W: Write> {
    writer: csv::Writer<W>,
}

impl ResultTable<File> {
    /// Create or truncate `path` and write the header row.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create dir {}", parent.display()))?;
            }
        }
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        Self::new(file).with_context(|| format!("write header to {}", path.display()))
    }
}

impl<W: Write> ResultTable<W> {
    pub fn new(inner: W) -> anyhow::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(OUTPUT_COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &ResultRow) -> anyhow::Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn write_pair(&mut self, pair: &ComparisonPair) -> anyhow::Result<()> {
        self.write_row(&pair.baseline)?;
        self.write_row(&pair.candidate)
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush output table: {}", e.error()))
    }
}

//! Batch use cases: run every case under a results root, or an explicit list.
//!
//! A batch is sequential. The driver's errors abort it; aggregation errors
//! become a degraded row and the batch moves on.

use crate::aggregate::read_benchmark;
use crate::driver::ReducerDriver;
use crate::output::ResultTable;
use anyhow::Context;
use reducebench_adapters::ProcessRunner;
use reducebench_config::BenchConfig;
use reducebench_domain::{format_ratio, size_ratio};
use reducebench_error::AggregateError;
use reducebench_types::{ComparisonPair, RATIO_NOT_AVAILABLE, ResultRow, TestCase};
use std::fs;
use std::io::Write;

/// Counters reported at the end of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Cases the reducer was run for.
    pub cases: usize,
    /// Cases that produced a comparison pair.
    pub pairs: usize,
    /// Cases recorded as a degraded row.
    pub degraded: usize,
    /// Candidates skipped because their staged folder or baseline output was missing.
    pub skipped: usize,
}

pub struct BatchUseCase<R: ProcessRunner> {
    driver: ReducerDriver<R>,
}

impl<R: ProcessRunner> BatchUseCase<R> {
    pub fn new(runner: R, config: BenchConfig) -> Self {
        Self {
            driver: ReducerDriver::new(runner, config),
        }
    }

    pub fn config(&self) -> &BenchConfig {
        self.driver.config()
    }

    pub fn driver(&self) -> &ReducerDriver<R> {
        &self.driver
    }

    /// Every case under the results root, for every configured decompiler.
    ///
    /// Cases without a staged strategy folder or a baseline `reduced`
    /// output are skipped silently.
    pub fn discover_cases(&self) -> anyhow::Result<(Vec<TestCase>, usize)> {
        let config = self.config();
        let root = &config.results_root;

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(root).with_context(|| format!("list {}", root.display()))? {
            let entry = entry.with_context(|| format!("list {}", root.display()))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let mut cases = Vec::new();
        let mut skipped = 0;
        for name in names {
            for &decompiler in &config.decompilers {
                let case = TestCase::new(name.clone(), decompiler);
                let layout = self.driver.layout(&case);
                if !layout.subfolder.exists() || !layout.baseline_reduced.exists() {
                    tracing::debug!(case = %case, "skipping: not staged or no baseline output");
                    skipped += 1;
                    continue;
                }
                cases.push(case);
            }
        }
        Ok((cases, skipped))
    }

    /// Run every discovered case and write to the `run-all` output table.
    ///
    /// The table and its header exist before the results root is listed.
    pub fn run_all(&self) -> anyhow::Result<BatchSummary> {
        let mut table = ResultTable::create(&self.config().output_all)?;
        let (cases, skipped) = self.discover_cases()?;
        let mut summary = self.run_cases(&cases, &mut table)?;
        summary.skipped = skipped;
        Ok(summary)
    }

    /// Run an explicit case list, without existence checks, into the
    /// `run-with` output table.
    pub fn run_with(&self, cases: &[TestCase]) -> anyhow::Result<BatchSummary> {
        let mut table = ResultTable::create(&self.config().output_list)?;
        self.run_cases(cases, &mut table)
    }

    /// Drive and aggregate `cases` in order, flushing after each.
    pub fn run_cases<W: Write>(
        &self,
        cases: &[TestCase],
        table: &mut ResultTable<W>,
    ) -> anyhow::Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for case in cases {
            let exit_code = self.driver.run(case)?;
            summary.cases += 1;

            match self.compare_case(case, exit_code) {
                Ok(pair) => {
                    table.write_pair(&pair)?;
                    summary.pairs += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        case = %case,
                        error = %err,
                        "aggregation failed; recording degraded row"
                    );
                    table.write_row(&ResultRow::degraded(
                        case,
                        &self.config().baseline_strategy,
                        err.to_string(),
                    ))?;
                    summary.degraded += 1;
                }
            }

            table
                .flush()
                .with_context(|| format!("flush results after {case}"))?;
        }

        Ok(summary)
    }

    /// Aggregate both strategies' workfolders for `case`.
    pub fn compare_case(
        &self,
        case: &TestCase,
        exit_code: i32,
    ) -> Result<ComparisonPair, AggregateError> {
        let config = self.config();
        let layout = self.driver.layout(case);

        let baseline = read_benchmark(&layout.baseline_workfolder)?;
        let candidate = read_benchmark(&layout.new_workfolder)?;
        let ratio = size_ratio(baseline.bytes, candidate.bytes)?;

        Ok(ComparisonPair {
            baseline: ResultRow::from_run(
                case,
                &config.baseline_strategy,
                &baseline,
                exit_code,
                RATIO_NOT_AVAILABLE.to_string(),
            ),
            candidate: ResultRow::from_run(
                case,
                &config.new_strategy,
                &candidate,
                exit_code,
                format_ratio(ratio),
            ),
        })
    }
}

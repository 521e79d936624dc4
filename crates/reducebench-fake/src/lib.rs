//! Fakes and fixtures for testing reducebench without a real reducer.
//!
//! `FakeProcessRunner` stands in for the reducer process; `WorkfolderFixture`
//! writes the files a reducer run would leave behind.

use anyhow::Context;
use reducebench_adapters::{AdapterError, CommandSpec, ProcessRunner, RunOutcome};
use reducebench_types::{METRICS_FILE, MetricsRow};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type Effect = Box<dyn Fn(&CommandSpec) -> anyhow::Result<()> + Send + Sync>;

/// Process runner that records every command and replays scripted exit codes.
///
/// Once the scripted codes run out, every further run exits 0.
#[derive(Default)]
pub struct FakeProcessRunner {
    exit_codes: Mutex<VecDeque<i32>>,
    calls: Mutex<Vec<CommandSpec>>,
    effect: Option<Effect>,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: Mutex::new(codes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Run `effect` on every invocation, before reporting the exit code.
    ///
    /// Use it to write the files a real reducer would produce.
    pub fn on_run<F>(mut self, effect: F) -> Self
    where
        F: Fn(&CommandSpec) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Script paths passed to `sh`, in call order.
    pub fn scripts(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.argv.get(1).map(PathBuf::from))
            .collect()
    }
}

impl ProcessRunner for FakeProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunOutcome, AdapterError> {
        if spec.argv.is_empty() {
            return Err(AdapterError::EmptyArgv);
        }

        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(spec.clone());

        if let Some(effect) = &self.effect {
            effect(spec)?;
        }

        let exit_code = self
            .exit_codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(0);

        Ok(RunOutcome {
            exit_code,
            wall_ms: 0,
        })
    }
}

/// Runner whose process never starts.
#[derive(Debug, Default, Clone)]
pub struct FailingProcessRunner;

impl ProcessRunner for FailingProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunOutcome, AdapterError> {
        Err(AdapterError::Other(anyhow::anyhow!(
            "failed to run {:?}: No such file or directory",
            spec.argv
        )))
    }
}

/// Shorthand for building a metrics row in tests.
pub fn metrics_row(
    folder: u64,
    judgment: &str,
    count: u64,
    bytes: u64,
    classes: u64,
) -> MetricsRow {
    MetricsRow {
        folder,
        judgment: judgment.to_string(),
        count,
        classes,
        bytes,
        time: 1.0,
        run_time: 0.5,
        setup_time: 0.25,
    }
}

/// Files a reducer run leaves in its workfolder.
#[derive(Debug, Clone, Default)]
pub struct WorkfolderFixture {
    pub rows: Vec<MetricsRow>,
    pub initial: Vec<String>,

    /// `(stage, sub, lines)` written to `<stage>/<sub>/stdout`.
    pub captures: Vec<(String, String, Vec<String>)>,
}

impl WorkfolderFixture {
    pub fn new(rows: Vec<MetricsRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn initial(mut self, lines: &[&str]) -> Self {
        self.initial = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn capture(mut self, stage: &str, sub: &str, lines: &[&str]) -> Self {
        self.captures.push((
            stage.to_string(),
            sub.to_string(),
            lines.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn write(&self, workfolder: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(workfolder)
            .with_context(|| format!("create dir {}", workfolder.display()))?;

        let metrics = workfolder.join(METRICS_FILE);
        let mut wtr = csv::Writer::from_path(&metrics)
            .with_context(|| format!("create {}", metrics.display()))?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        if self.rows.is_empty() {
            wtr.write_record([
                "folder",
                "judgment",
                "count",
                "classes",
                "bytes",
                "time",
                "run time",
                "setup time",
            ])?;
        }
        wtr.flush()?;

        write_lines(&workfolder.join("initial").join("stdout"), &self.initial)?;
        for (stage, sub, lines) in &self.captures {
            write_lines(&workfolder.join(stage).join(sub).join("stdout"), lines)?;
        }
        Ok(())
    }
}

fn write_lines(path: &Path, lines: &[String]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

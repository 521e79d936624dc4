//! Shared types for reducebench.
//!
//! Design goal: explicit, boring, one record per table.
//! `MetricsRow` is what the reducer writes; `ResultRow` is what we write.

use reducebench_error::ConfigError;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Judgment value the reducer writes for a passing iteration.
pub const SUCCESS_JUDGMENT: &str = "success";

/// Verify cell for a run whose later captures all kept the initial bugs.
pub const VERIFY_SUCCESS: &str = "success";

/// Ratio cell for the baseline row of a comparison pair.
pub const RATIO_NOT_AVAILABLE: &str = "N/A";

/// File name of the per-run metrics table inside a workfolder.
pub const METRICS_FILE: &str = "metrics.csv";

/// Output table columns, in order.
pub const OUTPUT_COLUMNS: [&str; 19] = [
    "name",
    "predicate",
    "strategy",
    "bugs",
    "initial-scc",
    "scc",
    "initial-classes",
    "classes",
    "initial-bytes",
    "bytes",
    "iters",
    "searches",
    "setup-time",
    "time",
    "status",
    "verify",
    "flaky",
    "exitcode",
    "ratio",
];

/// One reduction iteration, as written by the reducer to `metrics.csv`.
///
/// Columns not named here are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct MetricsRow {
    pub folder: u64,
    pub judgment: String,
    pub count: u64,
    pub classes: u64,
    pub bytes: u64,
    pub time: f64,

    #[serde(rename = "run time")]
    pub run_time: f64,

    #[serde(rename = "setup time")]
    pub setup_time: f64,
}

impl MetricsRow {
    pub fn is_success(&self) -> bool {
        self.judgment == SUCCESS_JUDGMENT
    }

    /// Wall time attributed to this iteration (time + run time + setup time).
    pub fn elapsed(&self) -> f64 {
        self.time + self.run_time + self.setup_time
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Bad,
    Timeout,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Bad => "bad",
            RunStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decompilers the corpus was produced with; each has its own predicate script.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Decompiler {
    Cfr,
    Fernflower,
    Procyon,
}

impl Decompiler {
    pub const ALL: [Decompiler; 3] = [Decompiler::Cfr, Decompiler::Fernflower, Decompiler::Procyon];

    pub fn as_str(self) -> &'static str {
        match self {
            Decompiler::Cfr => "cfr",
            Decompiler::Fernflower => "fernflower",
            Decompiler::Procyon => "procyon",
        }
    }
}

impl fmt::Display for Decompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decompiler {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cfr" => Ok(Decompiler::Cfr),
            "fernflower" => Ok(Decompiler::Fernflower),
            "procyon" => Ok(Decompiler::Procyon),
            other => Err(ConfigError::UnknownDecompiler(other.to_string())),
        }
    }
}

/// A (test case, decompiler) pair.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestCase {
    pub name: String,
    pub decompiler: Decompiler,
}

impl TestCase {
    pub fn new(name: impl Into<String>, decompiler: Decompiler) -> Self {
        Self {
            name: name.into(),
            decompiler,
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.decompiler)
    }
}

/// Summary of one reducer run, derived from its metrics table and captures.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunResult {
    pub status: RunStatus,
    pub initial_scc: u64,
    pub scc: u64,
    pub initial_classes: u64,
    pub classes: u64,
    pub initial_bytes: u64,
    pub bytes: u64,
    pub iters: u64,
    pub searches: u64,

    /// Elapsed time of the first row (the reducer's setup cost).
    pub setup_time: f64,

    /// NaN when the run timed out.
    pub time: f64,

    /// True when the unreduced input already failed its predicate.
    pub flaky: bool,

    pub bugs: usize,

    /// `"success"`, or the name of the first stage that lost a bug.
    pub verify: String,
}

/// One line of an output table.
///
/// Unset cells serialize as empty fields, so a degraded row carries only
/// the identifying columns and the status text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ResultRow {
    pub name: String,
    pub predicate: String,
    pub strategy: String,
    pub bugs: Option<usize>,
    pub initial_scc: Option<u64>,
    pub scc: Option<u64>,
    pub initial_classes: Option<u64>,
    pub classes: Option<u64>,
    pub initial_bytes: Option<u64>,
    pub bytes: Option<u64>,
    pub iters: Option<u64>,
    pub searches: Option<u64>,
    pub setup_time: Option<f64>,
    pub time: Option<f64>,
    pub status: String,
    pub verify: Option<String>,

    /// Written as `True` / `False`.
    #[serde(with = "capitalized_bool", default)]
    pub flaky: Option<bool>,
    pub exitcode: Option<i32>,
    pub ratio: Option<String>,
}

impl ResultRow {
    pub fn from_run(
        case: &TestCase,
        strategy: &str,
        run: &RunResult,
        exit_code: i32,
        ratio: String,
    ) -> Self {
        Self {
            name: case.name.clone(),
            predicate: case.decompiler.to_string(),
            strategy: strategy.to_string(),
            bugs: Some(run.bugs),
            initial_scc: Some(run.initial_scc),
            scc: Some(run.scc),
            initial_classes: Some(run.initial_classes),
            classes: Some(run.classes),
            initial_bytes: Some(run.initial_bytes),
            bytes: Some(run.bytes),
            iters: Some(run.iters),
            searches: Some(run.searches),
            setup_time: Some(run.setup_time),
            time: Some(run.time),
            status: run.status.to_string(),
            verify: Some(run.verify.clone()),
            flaky: Some(run.flaky),
            exitcode: Some(exit_code),
            ratio: Some(ratio),
        }
    }

    /// Row recorded when a case could not be aggregated.
    pub fn degraded(case: &TestCase, strategy: &str, status: impl Into<String>) -> Self {
        Self {
            name: case.name.clone(),
            predicate: case.decompiler.to_string(),
            strategy: strategy.to_string(),
            status: status.into(),
            ..Self::default()
        }
    }
}

/// `True` / `False` cells; lowercase is accepted on read.
mod capitalized_bool {
    use super::{Deserialize, Deserializer, Serializer};
    use serde::de::Error;

    pub fn serialize<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(true) => s.serialize_str("True"),
            Some(false) => s.serialize_str("False"),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        match Option::<String>::deserialize(d)?.as_deref() {
            None | Some("") => Ok(None),
            Some("True" | "true") => Ok(Some(true)),
            Some("False" | "false") => Ok(Some(false)),
            Some(other) => Err(D::Error::custom(format!("invalid flaky cell {other:?}"))),
        }
    }
}

/// Baseline and new-strategy rows for one test case.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonPair {
    pub baseline: ResultRow,
    pub candidate: ResultRow,
}

// ----------------------------
// Optional config file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompilers: Option<Vec<Decompiler>>,

    /// Explicit cases for `run-with`.
    #[serde(default, rename = "case")]
    pub cases: Vec<TestCase>,
}

/// Path and naming overrides. Anything left unset keeps its built-in default.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct DefaultsConfig {
    /// Directory holding one subdirectory per test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_root: Option<String>,

    /// Directory the run script is copied from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts_dir: Option<String>,

    /// Directory holding `compile.sh` and the `predicate2_<decompiler>.sh` scripts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helpers_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_script: Option<String>,

    /// Per-decompiler subdirectory the reducer works in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_workfolder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_workfolder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_reduced: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_reduced: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_strategy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_strategy: Option<String>,

    /// Output table for `run-all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_all: Option<String>,

    /// Output table for `run-with`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_list: Option<String>,
}

//! Configuration for reducebench batches.
//!
//! Every setting has a built-in default, so a batch runs with no config
//! file at all. A TOML file can override any of them, and the CLI can
//! override the file.

use reducebench_error::ConfigError;
use reducebench_types::{ConfigFile, Decompiler, TestCase};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULTS_ROOT: &str = "result/full";
pub const DEFAULT_SCRIPTS_DIR: &str = "scripts";
pub const DEFAULT_HELPERS_DIR: &str = "scripts";
pub const DEFAULT_RUN_SCRIPT: &str = "run2.sh";
pub const DEFAULT_STRATEGY_DIR: &str = "items+logic";
pub const DEFAULT_BASELINE_WORKFOLDER: &str = "workfolder";
pub const DEFAULT_NEW_WORKFOLDER: &str = "workfolder2";
pub const DEFAULT_BASELINE_REDUCED: &str = "reduced";
pub const DEFAULT_NEW_REDUCED: &str = "reduced2";
pub const DEFAULT_BASELINE_STRATEGY: &str = "items+logic";
pub const DEFAULT_NEW_STRATEGY: &str = "items+logic+cls";
pub const DEFAULT_OUTPUT_ALL: &str = "reduced_results.csv";
pub const DEFAULT_OUTPUT_LIST: &str = "reduced_results_indiv.csv";

/// Resolved settings for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub results_root: PathBuf,
    pub scripts_dir: PathBuf,
    pub helpers_dir: PathBuf,
    pub run_script: String,
    pub strategy_dir: String,
    pub baseline_workfolder: String,
    pub new_workfolder: String,
    pub baseline_reduced: String,
    pub new_reduced: String,
    pub baseline_strategy: String,
    pub new_strategy: String,
    pub output_all: PathBuf,
    pub output_list: PathBuf,
    pub decompilers: Vec<Decompiler>,
    pub cases: Vec<TestCase>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from(DEFAULT_RESULTS_ROOT),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            helpers_dir: PathBuf::from(DEFAULT_HELPERS_DIR),
            run_script: DEFAULT_RUN_SCRIPT.to_string(),
            strategy_dir: DEFAULT_STRATEGY_DIR.to_string(),
            baseline_workfolder: DEFAULT_BASELINE_WORKFOLDER.to_string(),
            new_workfolder: DEFAULT_NEW_WORKFOLDER.to_string(),
            baseline_reduced: DEFAULT_BASELINE_REDUCED.to_string(),
            new_reduced: DEFAULT_NEW_REDUCED.to_string(),
            baseline_strategy: DEFAULT_BASELINE_STRATEGY.to_string(),
            new_strategy: DEFAULT_NEW_STRATEGY.to_string(),
            output_all: PathBuf::from(DEFAULT_OUTPUT_ALL),
            output_list: PathBuf::from(DEFAULT_OUTPUT_LIST),
            decompilers: Decompiler::ALL.to_vec(),
            cases: Vec::new(),
        }
    }
}

impl BenchConfig {
    /// Apply a parsed config file on top of the defaults.
    pub fn from_file(file: ConfigFile) -> Self {
        let mut cfg = Self::default();
        let d = file.defaults;

        if let Some(v) = d.results_root {
            cfg.results_root = PathBuf::from(v);
        }
        if let Some(v) = d.scripts_dir {
            cfg.scripts_dir = PathBuf::from(v);
        }
        if let Some(v) = d.helpers_dir {
            cfg.helpers_dir = PathBuf::from(v);
        }
        if let Some(v) = d.run_script {
            cfg.run_script = v;
        }
        if let Some(v) = d.strategy_dir {
            cfg.strategy_dir = v;
        }
        if let Some(v) = d.baseline_workfolder {
            cfg.baseline_workfolder = v;
        }
        if let Some(v) = d.new_workfolder {
            cfg.new_workfolder = v;
        }
        if let Some(v) = d.baseline_reduced {
            cfg.baseline_reduced = v;
        }
        if let Some(v) = d.new_reduced {
            cfg.new_reduced = v;
        }
        if let Some(v) = d.baseline_strategy {
            cfg.baseline_strategy = v;
        }
        if let Some(v) = d.new_strategy {
            cfg.new_strategy = v;
        }
        if let Some(v) = d.output_all {
            cfg.output_all = PathBuf::from(v);
        }
        if let Some(v) = d.output_list {
            cfg.output_list = PathBuf::from(v);
        }
        if let Some(v) = file.decompilers {
            cfg.decompilers = v;
        }
        cfg.cases = file.cases;
        cfg
    }

    /// Load `path` if given, otherwise return the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Ok(Self::from_file(load_config_file(p)?)),
            None => Ok(Self::default()),
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `NAME:DECOMPILER`. The name may itself contain colons.
pub fn parse_case(s: &str) -> Result<TestCase, ConfigError> {
    let (name, decompiler) = s
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::InvalidCase(s.to_string()))?;
    if name.is_empty() {
        return Err(ConfigError::InvalidCase(s.to_string()));
    }
    Ok(TestCase::new(name, decompiler.parse()?))
}

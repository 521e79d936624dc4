//! Staging and running the reducer for one test case.

use anyhow::Context;
use reducebench_adapters::{CommandSpec, ProcessRunner, StagePlan, apply_stage_plan};
use reducebench_config::BenchConfig;
use reducebench_types::{Decompiler, TestCase};
use std::path::{Path, PathBuf};

/// Name the predicate script is staged under.
pub const PREDICATE_NAME: &str = "predicate2";
pub const COMPILE_HELPER: &str = "compile.sh";
pub const UTILS_DIR: &str = "utils";

/// Every path the driver and the aggregator touch for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseLayout {
    /// `<root>/<case>/<decompiler>/<strategy_dir>`
    pub subfolder: PathBuf,
    pub run_script: PathBuf,
    pub utils_dir: PathBuf,
    pub compile_helper: PathBuf,
    pub predicate: PathBuf,
    pub baseline_workfolder: PathBuf,
    pub new_workfolder: PathBuf,
    pub baseline_reduced: PathBuf,
    pub new_reduced: PathBuf,
}

impl CaseLayout {
    pub fn new(config: &BenchConfig, case: &TestCase) -> Self {
        let subfolder = config
            .results_root
            .join(&case.name)
            .join(case.decompiler.as_str())
            .join(&config.strategy_dir);
        let utils_dir = subfolder.join(UTILS_DIR);

        Self {
            run_script: subfolder.join(&config.run_script),
            compile_helper: utils_dir.join(COMPILE_HELPER),
            utils_dir,
            predicate: subfolder.join(PREDICATE_NAME),
            baseline_workfolder: subfolder.join(&config.baseline_workfolder),
            new_workfolder: subfolder.join(&config.new_workfolder),
            baseline_reduced: subfolder.join(&config.baseline_reduced),
            new_reduced: subfolder.join(&config.new_reduced),
            subfolder,
        }
    }

    /// Copies, permissions and cleanup for a new-strategy run.
    ///
    /// The baseline's workfolder and reduced output are left alone.
    pub fn stage_plan(&self, config: &BenchConfig, decompiler: Decompiler) -> StagePlan {
        StagePlan {
            dirs: vec![self.utils_dir.clone()],
            copies: vec![
                (
                    config.scripts_dir.join(&config.run_script),
                    self.run_script.clone(),
                ),
                (
                    config.helpers_dir.join(COMPILE_HELPER),
                    self.compile_helper.clone(),
                ),
                (
                    predicate_source(&config.helpers_dir, decompiler),
                    self.predicate.clone(),
                ),
            ],
            executables: vec![self.run_script.clone(), self.predicate.clone()],
            clear: vec![self.new_workfolder.clone(), self.new_reduced.clone()],
        }
    }
}

/// `<helpers_dir>/predicate2_<decompiler>.sh`
pub fn predicate_source(helpers_dir: &Path, decompiler: Decompiler) -> PathBuf {
    helpers_dir.join(format!("{PREDICATE_NAME}_{decompiler}.sh"))
}

pub struct ReducerDriver<R: ProcessRunner> {
    runner: R,
    config: BenchConfig,
}

impl<R: ProcessRunner> ReducerDriver<R> {
    pub fn new(runner: R, config: BenchConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn layout(&self, case: &TestCase) -> CaseLayout {
        CaseLayout::new(&self.config, case)
    }

    /// Stage the case and run the reducer to completion.
    ///
    /// Returns the script's exit code without judging it.
    pub fn run(&self, case: &TestCase) -> anyhow::Result<i32> {
        let layout = self.layout(case);
        let plan = layout.stage_plan(&self.config, case.decompiler);
        apply_stage_plan(&plan).with_context(|| format!("failed to stage {case}"))?;

        tracing::info!(case = %case, "running {case}");

        let spec = CommandSpec::shell_script(&layout.run_script);
        let outcome = self
            .runner
            .run(&spec)
            .with_context(|| format!("failed to run reducer for {case}: {:?}", spec.argv))?;

        if outcome.exit_code != 0 {
            tracing::warn!(case = %case, exit_code = outcome.exit_code, "reducer exited nonzero");
        }
        tracing::debug!(case = %case, wall_ms = outcome.wall_ms, "reducer finished");

        Ok(outcome.exit_code)
    }
}

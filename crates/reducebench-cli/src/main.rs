use anyhow::Context;
use clap::{Parser, Subcommand};
use reducebench_adapters::StdProcessRunner;
use reducebench_app::{BatchSummary, BatchUseCase, read_benchmark};
use reducebench_config::{BenchConfig, parse_case};
use reducebench_types::TestCase;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "reducebench",
    version,
    about = "Compare reducer strategies across decompiler test cases"
)]
struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Results root holding one folder per test case
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output table (overrides the subcommand's configured table)
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Directory holding the reducer run script
    #[arg(long, global = true)]
    scripts_dir: Option<PathBuf>,

    /// Directory holding the compile helper and predicate templates
    #[arg(long, global = true)]
    helpers_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every staged case under the results root, for every decompiler.
    RunAll,

    /// Run an explicit list of cases.
    RunWith {
        /// Case as NAME:DECOMPILER. Repeatable; falls back to the config's [[case]] list.
        #[arg(long = "case", value_parser = parse_case_arg)]
        cases: Vec<TestCase>,
    },

    /// Aggregate one workfolder and print its run result as JSON.
    Aggregate {
        #[arg(long)]
        workfolder: PathBuf,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    if let Err(err) = real_main() {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = BenchConfig::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.results_root = root.clone();
    }
    if let Some(dir) = &cli.scripts_dir {
        config.scripts_dir = dir.clone();
    }
    if let Some(dir) = &cli.helpers_dir {
        config.helpers_dir = dir.clone();
    }

    match cli.cmd {
        Command::RunAll => {
            if let Some(out) = cli.out {
                config.output_all = out;
            }
            let out = config.output_all.clone();
            let usecase = BatchUseCase::new(StdProcessRunner, config);
            let summary = usecase.run_all()?;
            report(&summary, &out);
            Ok(())
        }

        Command::RunWith { cases } => {
            if let Some(out) = cli.out {
                config.output_list = out;
            }
            let cases = if cases.is_empty() {
                config.cases.clone()
            } else {
                cases
            };
            if cases.is_empty() {
                anyhow::bail!(
                    "no cases given: pass --case NAME:DECOMPILER or list [[case]] in the config"
                );
            }
            let out = config.output_list.clone();
            let usecase = BatchUseCase::new(StdProcessRunner, config);
            let summary = usecase.run_with(&cases)?;
            report(&summary, &out);
            Ok(())
        }

        Command::Aggregate { workfolder, pretty } => {
            let result = read_benchmark(&workfolder)
                .with_context(|| format!("aggregate {}", workfolder.display()))?;
            match cli.out {
                Some(out) => write_json(&out, &result, pretty),
                None => {
                    let text = if pretty {
                        serde_json::to_string_pretty(&result)?
                    } else {
                        serde_json::to_string(&result)?
                    };
                    println!("{text}");
                    Ok(())
                }
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_case_arg(s: &str) -> Result<TestCase, String> {
    parse_case(s).map_err(|e| e.to_string())
}

fn report(summary: &BatchSummary, out: &Path) {
    tracing::info!(
        cases = summary.cases,
        pairs = summary.pairs,
        degraded = summary.degraded,
        skipped = summary.skipped,
        "batch finished"
    );
    eprintln!(
        "{} case(s): {} compared, {} degraded, {} skipped -> {}",
        summary.cases,
        summary.pairs,
        summary.degraded,
        summary.skipped,
        out.display()
    );
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }

    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

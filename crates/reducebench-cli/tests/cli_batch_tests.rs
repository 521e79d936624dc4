//! Integration tests for `reducebench run-all` and `reducebench run-with`.
//!
//! The reducer is a shell script that copies a prepared `candidate/`
//! folder into place as the new workfolder.

#![cfg(unix)]
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const RUN_SCRIPT: &str = r#"#!/bin/sh
dir=$(dirname "$0")
test -x "$dir/predicate2" || exit 3
test -f "$dir/utils/compile.sh" || exit 4
cp -R "$dir/candidate" "$dir/workfolder2"
exit ${REDUCER_EXIT:-0}
"#;

struct Bench {
    tmp: TempDir,
}

impl Bench {
    fn new() -> Self {
        let tmp = tempdir().expect("failed to create temp dir");
        let scripts = tmp.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("run2.sh"), RUN_SCRIPT).unwrap();
        fs::write(scripts.join("compile.sh"), "#!/bin/sh\n").unwrap();
        for d in ["cfr", "fernflower", "procyon"] {
            fs::write(scripts.join(format!("predicate2_{d}.sh")), "#!/bin/sh\nexit 0\n").unwrap();
        }
        fs::create_dir_all(tmp.path().join("full")).unwrap();
        Self { tmp }
    }

    fn path(&self) -> &Path {
        self.tmp.path()
    }

    fn subfolder(&self, case: &str, decompiler: &str) -> PathBuf {
        self.path()
            .join("full")
            .join(case)
            .join(decompiler)
            .join("items+logic")
    }

    /// A case whose baseline run already finished.
    fn stage(&self, case: &str, decompiler: &str, baseline_bytes: u64, new_bytes: u64) {
        let sub = self.subfolder(case, decompiler);
        fs::create_dir_all(sub.join("reduced")).unwrap();
        write_workfolder(&sub.join("workfolder"), baseline_bytes, &["bug-a"]);
        write_workfolder(&sub.join("candidate"), new_bytes, &["bug-a"]);
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("reducebench").expect("failed to find reducebench binary");
        cmd.current_dir(self.path())
            .arg("--root")
            .arg(self.path().join("full"))
            .arg("--scripts-dir")
            .arg(self.path().join("scripts"))
            .arg("--helpers-dir")
            .arg(self.path().join("scripts"));
        cmd
    }

    fn rows(&self, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(self.path().join(file)).unwrap();
        rdr.records().collect::<Result<_, _>>().unwrap()
    }
}

fn write_workfolder(wf: &Path, final_bytes: u64, bugs: &[&str]) {
    fs::create_dir_all(wf.join("initial")).unwrap();
    fs::create_dir_all(wf.join("0001").join("a")).unwrap();
    fs::write(
        wf.join("metrics.csv"),
        format!(
            "folder,judgment,count,classes,bytes,time,run time,setup time\n\
             0,success,10,4,8000,1.0,0.5,0.2\n\
             2,success,3,1,{final_bytes},2.0,0.5,0.1\n"
        ),
    )
    .unwrap();
    let mut text = bugs.join("\n");
    text.push('\n');
    fs::write(wf.join("initial").join("stdout"), &text).unwrap();
    fs::write(wf.join("0001").join("a").join("stdout"), &text).unwrap();
}

#[test]
fn run_all_writes_comparison_table() {
    let bench = Bench::new();
    bench.stage("url0a1b", "cfr", 2000, 500);

    bench
        .cmd()
        .arg("run-all")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 case(s): 1 compared, 0 degraded"));

    let text = fs::read_to_string(bench.path().join("reduced_results.csv")).unwrap();
    assert!(text.starts_with(
        "name,predicate,strategy,bugs,initial-scc,scc,initial-classes,classes,initial-bytes,bytes,iters,searches,setup-time,time,status,verify,flaky,exitcode,ratio\n"
    ));

    let rows = bench.rows("reduced_results.csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "url0a1b");
    assert_eq!(&rows[0][1], "cfr");
    assert_eq!(&rows[0][2], "items+logic");
    assert_eq!(&rows[0][18], "N/A");
    assert_eq!(&rows[1][2], "items+logic+cls");
    assert_eq!(&rows[1][9], "500");
    assert_eq!(&rows[1][16], "False");
    assert_eq!(&rows[1][17], "0");
    assert_eq!(&rows[1][18], "0.25");
}

#[test]
fn run_all_on_empty_root_writes_header_only() {
    let bench = Bench::new();

    bench.cmd().arg("run-all").assert().success();

    let text = fs::read_to_string(bench.path().join("reduced_results.csv")).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn run_all_records_degraded_row_and_keeps_going() {
    let bench = Bench::new();
    bench.stage("a-broken", "cfr", 2000, 500);
    bench.stage("b-fine", "procyon", 1000, 400);
    fs::remove_file(bench.subfolder("a-broken", "cfr").join("candidate/metrics.csv")).unwrap();

    bench
        .cmd()
        .arg("run-all")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 degraded"));

    let rows = bench.rows("reduced_results.csv");
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "a-broken");
    assert!(rows[0][14].contains("metrics.csv"), "status: {}", &rows[0][14]);
    assert_eq!(&rows[0][9], "");
    assert_eq!(&rows[2][0], "b-fine");
    assert_eq!(&rows[2][18], "0.4");
}

#[test]
fn run_with_uses_its_own_table_and_records_exit_code() {
    let bench = Bench::new();
    bench.stage("url0a1b", "fernflower", 1000, 1000);
    let out = bench.path().join("out").join("indiv.csv");

    bench
        .cmd()
        .env("REDUCER_EXIT", "5")
        .args(["run-with", "--case", "url0a1b:fernflower", "--out"])
        .arg(&out)
        .assert()
        .success();

    assert!(!bench.path().join("reduced_results.csv").exists());
    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][17], "5");
    assert_eq!(&rows[1][18], "1.0");
}

#[test]
fn run_with_reads_cases_from_config() {
    let bench = Bench::new();
    bench.stage("url0a1b", "cfr", 100, 10);
    let config = bench.path().join("reducebench.toml");
    fs::write(
        &config,
        "[defaults]\noutput_list = \"list.csv\"\n\n\
         [[case]]\nname = \"url0a1b\"\ndecompiler = \"cfr\"\n",
    )
    .unwrap();

    bench
        .cmd()
        .arg("--config")
        .arg(&config)
        .arg("run-with")
        .assert()
        .success();

    let rows = bench.rows("list.csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][18], "0.1");
}

#[test]
fn run_with_without_cases_fails() {
    let bench = Bench::new();
    bench
        .cmd()
        .arg("run-with")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cases given"));
}

#[test]
fn run_with_rejects_unknown_decompiler() {
    let bench = Bench::new();
    bench
        .cmd()
        .args(["run-with", "--case", "url0a1b:javap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("javap"));
}

#[test]
fn missing_run_script_aborts_batch() {
    let bench = Bench::new();
    bench.stage("url0a1b", "cfr", 100, 10);
    fs::remove_file(bench.path().join("scripts/run2.sh")).unwrap();

    bench
        .cmd()
        .arg("run-all")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to stage url0a1b:cfr"));
}

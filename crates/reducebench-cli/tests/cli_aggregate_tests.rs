//! Integration tests for `reducebench aggregate`.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const METRICS: &str = "\
folder,judgment,count,classes,bytes,time,run time,setup time
0,fail,100,10,5000,1.0,0.5,0.2
1,success,50,5,2000,2.0,0.5,0.1
";

fn write_workfolder(wf: &Path) {
    fs::create_dir_all(wf.join("initial")).unwrap();
    fs::create_dir_all(wf.join("0001").join("a")).unwrap();
    fs::write(wf.join("metrics.csv"), METRICS).unwrap();
    fs::write(wf.join("initial").join("stdout"), "bug-a\nbug-b\n").unwrap();
    fs::write(wf.join("0001").join("a").join("stdout"), "bug-b\nbug-a\n").unwrap();
}

#[test]
fn aggregate_prints_run_result_json() {
    let tmp = tempdir().expect("failed to create temp dir");
    let wf = tmp.path().join("workfolder");
    write_workfolder(&wf);

    let output = Command::cargo_bin("reducebench")
        .expect("failed to find reducebench binary")
        .arg("aggregate")
        .arg("--workfolder")
        .arg(&wf)
        .output()
        .expect("failed to run reducebench");
    assert!(output.status.success());

    let v: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(v["status"], "success");
    assert_eq!(v["scc"], 50);
    assert_eq!(v["initial_scc"], 100);
    assert_eq!(v["bytes"], 2000);
    assert_eq!(v["initial_bytes"], 5000);
    assert_eq!(v["iters"], 1);
    assert_eq!(v["flaky"], true);
    assert_eq!(v["bugs"], 2);
    assert_eq!(v["verify"], "success");
    let time = v["time"].as_f64().unwrap();
    assert!((time - 2.6).abs() < 1e-9, "time = {time}");
}

#[test]
fn aggregate_writes_pretty_json_to_out() {
    let tmp = tempdir().expect("failed to create temp dir");
    let wf = tmp.path().join("workfolder");
    write_workfolder(&wf);
    let out = tmp.path().join("nested").join("result.json");

    Command::cargo_bin("reducebench")
        .unwrap()
        .args(["aggregate", "--pretty", "--workfolder"])
        .arg(&wf)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("\n  \"status\": \"success\""), "got {text}");
}

#[test]
fn aggregate_missing_workfolder_fails_with_path() {
    let tmp = tempdir().unwrap();

    Command::cargo_bin("reducebench")
        .unwrap()
        .arg("aggregate")
        .arg("--workfolder")
        .arg(tmp.path().join("workfolder2"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("metrics.csv"));
}

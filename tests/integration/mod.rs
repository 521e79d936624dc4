//! Workspace integration tests: real `sh` reducer scripts driven through
//! the app layer.

#![cfg(unix)]

use reducebench_adapters::StdProcessRunner;
use reducebench_app::{BatchUseCase, CaseLayout, read_benchmark};
use reducebench_config::BenchConfig;
use reducebench_domain::search_count;
use reducebench_types::{Decompiler, ResultRow, RunStatus, TestCase, VERIFY_SUCCESS};
use std::fs;
use std::path::Path;

/// Leaves a fixed new-strategy workfolder next to itself.
const REDUCER: &str = r#"#!/bin/sh
wf="$(dirname "$0")/workfolder2"
mkdir -p "$wf/initial" "$wf/stage/0001" "$wf/stage/0002"
cat > "$wf/metrics.csv" <<CSV
folder,judgment,count,classes,bytes,time,run time,setup time
0,fail,100,10,5000,1.0,0.5,0.2
1,success,50,5,2000,2.0,0.5,0.1
CSV
printf 'bug-a\nbug-b\n' > "$wf/initial/stdout"
printf 'bug-a\nbug-b\n' > "$wf/stage/0001/stdout"
printf 'bug-b\n' > "$wf/stage/0002/stdout"
exit 0
"#;

fn seed(root: &Path) -> BenchConfig {
    let scripts = root.join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join("run2.sh"), REDUCER).unwrap();
    fs::write(scripts.join("compile.sh"), "#!/bin/sh\n").unwrap();
    for d in Decompiler::ALL {
        fs::write(scripts.join(format!("predicate2_{d}.sh")), "#!/bin/sh\n").unwrap();
    }
    BenchConfig {
        results_root: root.join("full"),
        scripts_dir: scripts.clone(),
        helpers_dir: scripts,
        output_all: root.join("reduced_results.csv"),
        output_list: root.join("reduced_results_indiv.csv"),
        ..BenchConfig::default()
    }
}

fn stage_baseline(layout: &CaseLayout) {
    fs::create_dir_all(&layout.baseline_reduced).unwrap();
    let wf = &layout.baseline_workfolder;
    fs::create_dir_all(wf.join("initial")).unwrap();
    fs::write(
        wf.join("metrics.csv"),
        "folder,judgment,count,classes,bytes,time,run time,setup time\n\
         0,success,100,10,5000,1.0,0.5,0.2\n\
         3,success,40,4,4000,3.0,0.5,0.1\n",
    )
    .unwrap();
    fs::write(wf.join("initial/stdout"), "bug-a\nbug-b\n").unwrap();
}

#[test]
fn real_reducer_run_produces_scenario_values() {
    let tmp = tempfile::tempdir().unwrap();
    let config = seed(tmp.path());
    let case = TestCase::new("url0a1b", Decompiler::Cfr);
    let layout = CaseLayout::new(&config, &case);
    stage_baseline(&layout);

    let batch = BatchUseCase::new(StdProcessRunner, config.clone());
    let summary = batch.run_all().unwrap();
    assert_eq!((summary.cases, summary.pairs, summary.degraded), (1, 1, 0));

    let candidate = read_benchmark(&layout.new_workfolder).unwrap();
    assert_eq!(candidate.status, RunStatus::Success);
    assert_eq!((candidate.initial_scc, candidate.scc), (100, 50));
    assert_eq!((candidate.initial_bytes, candidate.bytes), (5000, 2000));
    assert_eq!((candidate.initial_classes, candidate.classes), (10, 5));
    assert_eq!(candidate.iters, 1);
    assert!(candidate.flaky);
    assert!((candidate.time - 2.6).abs() < 1e-9);
    assert_eq!(candidate.searches, search_count([100, 50]));
    assert_eq!(candidate.verify, "0002");

    let mut rdr = csv::Reader::from_path(&config.output_all).unwrap();
    let rows: Vec<ResultRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].verify.as_deref(), Some(VERIFY_SUCCESS));
    assert_eq!(rows[0].bytes, Some(4000));
    assert_eq!(rows[1].verify.as_deref(), Some("0002"));
    assert_eq!(rows[1].ratio.as_deref(), Some("0.5"));
}

#[test]
fn rerun_replaces_previous_candidate_output() {
    let tmp = tempfile::tempdir().unwrap();
    let config = seed(tmp.path());
    let case = TestCase::new("url0a1b", Decompiler::Procyon);
    let layout = CaseLayout::new(&config, &case);
    stage_baseline(&layout);
    fs::create_dir_all(layout.new_workfolder.join("stale-stage/x")).unwrap();
    fs::write(layout.new_workfolder.join("stale-stage/x/stdout"), "").unwrap();
    fs::create_dir_all(&layout.new_reduced).unwrap();

    let batch = BatchUseCase::new(StdProcessRunner, config);
    batch.run_with(std::slice::from_ref(&case)).unwrap();

    assert!(!layout.new_workfolder.join("stale-stage").exists());
    assert!(!layout.new_reduced.exists());
    assert!(layout.baseline_reduced.exists());
    assert!(layout.baseline_workfolder.join("metrics.csv").exists());
}

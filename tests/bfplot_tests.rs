#![cfg(unix)]

use bfplot::{
    Dataset, DatasetResult, Error, ProcessRunner, Schedule, ScheduleKind, Suite, Sweep,
    SweepConfig,
};
use std::fs::{self, File};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::{tempdir, TempDir};

/*
 * These tests drive a shell script standing in for the Bellman-Ford binary. It prints the same
 * lines the real program does, with a runtime of 8000 / threads nanoseconds, and appends
 * "<OMP_SCHEDULE>|<threads>" to calls.log next to itself for every invocation.
 */
const SCALING_PROGRAM: &str = r#"#!/bin/sh
threads=0
while [ $# -gt 0 ]; do
  case "$1" in
    -p) threads="$2"; shift 2 ;;
    *) shift ;;
  esac
done
echo "${OMP_SCHEDULE}|${threads}" >> "$(dirname "$0")/calls.log"
if [ "$threads" -eq 0 ]; then
  echo "Solving SSSP from node 1 via serial Bellman-Ford algorithm..."
  echo "elapsed process CPU time = 8000 nanoseconds"
else
  echo "Solving SSSP from node 1 via parallel Bellman-Ford algorithm..."
  echo "OpenMP: running $0 with $threads threads"
  echo "elapsed process CPU time = $((8000 / threads)) nanoseconds"
fi
"#;

const FAILING_PROGRAM: &str = r#"#!/bin/sh
echo "could not open graph file" >&2
exit 3
"#;

const SILENT_PROGRAM: &str = r#"#!/bin/sh
echo "usage: bellman-ford -f filename -s src_id [-p num_threads]"
"#;

// Writing an executable while another test thread forks can make exec fail with ETXTBSY, so the
// tests that create and run scripts take turns.
static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn write_program(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("bellman-ford");
    {
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f.sync_all().unwrap();
    }
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(dir: &TempDir, program: PathBuf) -> SweepConfig {
    let mut config = SweepConfig::new(program);
    config
        .datasets
        .push(Dataset::new(dir.path().join("rmat15.dimacs"), "1", None));
    config.threads = vec![1, 2, 4];
    config.repetitions = 2;
    config.schedules = vec![
        Schedule::new(ScheduleKind::Static, Some(8)),
        Schedule::new(ScheduleKind::Dynamic, None),
    ];
    config.output_directory = dir.path().join("out");
    config
}

fn calls(dir: &TempDir) -> Vec<String> {
    fs::read_to_string(dir.path().join("calls.log"))
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn verify_file(dir: &Path, name: &str) -> PathBuf {
    let full_path = dir.join(name);
    assert!(
        full_path.is_file(),
        "File {:?} does not exist or is not a file",
        full_path
    );
    let metadata = full_path.metadata().unwrap();
    assert!(metadata.len() > 0);
    full_path
}

fn verify_svg(dir: &Path, name: &str) {
    let path = verify_file(dir, name);
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("<svg"));
}

#[test]
fn sweep_measures_and_plots_every_schedule() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, SCALING_PROGRAM);
    let mut config = config(&dir, program);
    config.outputs.csv = true;
    config.outputs.json = true;

    let results = Sweep::new(config).run(&mut ProcessRunner).unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.serial.mean, 8000.0);
    assert_eq!(result.schedules.len(), 2);
    for schedule in &result.schedules {
        assert_eq!(schedule.runtimes(), vec![8000.0, 4000.0, 2000.0]);
        assert_eq!(schedule.speedups(), vec![1.0, 2.0, 4.0]);
    }

    // 2 serial runs, then 2 schedules x 3 thread counts x 2 runs
    let calls = calls(&dir);
    assert_eq!(calls.len(), 2 + 2 * 3 * 2);
    assert_eq!(calls[0], "|0");
    assert_eq!(calls[2], "static,8|1");
    assert_eq!(calls[6], "static,8|4");
    assert_eq!(calls[8], "dynamic|1");

    let out = dir.path().join("out");
    verify_svg(&out, "rmat15_runtime_(static,8).svg");
    verify_svg(&out, "rmat15_speedup_(static,8).svg");
    verify_svg(&out, "rmat15_runtime_(dynamic).svg");
    verify_svg(&out, "rmat15_speedup_(dynamic).svg");

    let csv = fs::read_to_string(verify_file(&out, "rmat15_runs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1 + 14);
    assert!(csv.contains("rmat15,\"static,8\",4,2,2000.0"));

    let summary = File::open(verify_file(&out, "rmat15_summary.json")).unwrap();
    let summary: DatasetResult = serde_json::from_reader(summary).unwrap();
    assert_eq!(&summary, result);
}

#[test]
fn unscheduled_sweep_leaves_environment_alone() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, SCALING_PROGRAM);
    let mut config = config(&dir, program);
    config.schedules.clear();

    let results = Sweep::new(config).run(&mut ProcessRunner).unwrap();
    assert_eq!(results[0].schedules.len(), 1);
    assert_eq!(results[0].schedules[0].schedule, None);

    if std::env::var_os("OMP_SCHEDULE").is_none() {
        assert!(calls(&dir).iter().all(|line| line.starts_with('|')));
    }

    let out = dir.path().join("out");
    verify_svg(&out, "rmat15_runtime.svg");
    verify_svg(&out, "rmat15_speedup.svg");
    assert!(!out.join("rmat15_runs.csv").exists());
}

#[test]
fn no_plot_writes_no_charts() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, SCALING_PROGRAM);
    let mut config = config(&dir, program);
    config.outputs.plots = false;
    config.outputs.json = true;

    Sweep::new(config).run(&mut ProcessRunner).unwrap();

    let out = dir.path().join("out");
    verify_file(&out, "rmat15_summary.json");
    let svgs = fs::read_dir(&out)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .map(|e| e.path().extension().map_or(false, |ext| ext == "svg"))
                .unwrap_or(false)
        })
        .count();
    assert_eq!(svgs, 0);
}

#[test]
fn failing_program_stops_the_sweep() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, FAILING_PROGRAM);

    match Sweep::new(config(&dir, program)).run(&mut ProcessRunner) {
        Err(Error::ExitStatus { status, stderr, .. }) => {
            assert_eq!(status.code(), Some(3));
            assert!(stderr.contains("could not open graph file"));
        }
        other => panic!("expected ExitStatus, got {:?}", other),
    }
    assert!(!dir.path().join("out").join("rmat15_runtime_(static,8).svg").exists());
}

#[test]
fn output_without_timing_line_stops_the_sweep() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, SILENT_PROGRAM);

    match Sweep::new(config(&dir, program)).run(&mut ProcessRunner) {
        Err(Error::MissingRuntime { output }) => assert!(output.starts_with("usage:")),
        other => panic!("expected MissingRuntime, got {:?}", other),
    }
}

#[test]
fn suite_runs_every_dataset() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, SCALING_PROGRAM);

    let suite_path = dir.path().join("suite.json");
    fs::write(
        &suite_path,
        r#"{"datasets": [
            {"title": "rmat15", "input": "/tmp/rmat15.dimacs", "source": "1"},
            {"title": "roadNY", "input": "/tmp/roadNY.dimacs", "source": "140961"}
        ]}"#,
    )
    .unwrap();

    let mut config = config(&dir, program);
    config.datasets = Suite::load(&suite_path).unwrap().datasets;
    config.schedules = vec![Schedule::new(ScheduleKind::Guided, Some(32))];
    config.threads = vec![2];
    config.repetitions = 1;

    let mut sweep = Sweep::new(config);
    assert_eq!(sweep.config().datasets.len(), 2);
    let results = sweep.run(&mut ProcessRunner).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].dataset.source, "140961");
    assert_eq!(calls(&dir).len(), 2 * (1 + 1));

    let out = dir.path().join("out");
    verify_svg(&out, "rmat15_speedup_(guided,32).svg");
    verify_svg(&out, "roadNY_runtime_(guided,32).svg");
}

const INSTANT_PROGRAM: &str = r#"#!/bin/sh
case " $* " in
  *" -p "*) echo "elapsed process CPU time = 0 nanoseconds" ;;
  *) echo "elapsed process CPU time = 8000 nanoseconds" ;;
esac
"#;

#[test]
fn zero_parallel_runtime_writes_no_summary() {
    let _guard = lock();
    let dir = tempdir().unwrap();
    let program = write_program(&dir, INSTANT_PROGRAM);
    let mut config = config(&dir, program);
    config.outputs.json = true;

    match Sweep::new(config).run(&mut ProcessRunner) {
        Err(Error::ZeroRuntime { command }) => assert!(command.contains("-p 1")),
        other => panic!("expected ZeroRuntime, got {:?}", other),
    }
    assert!(!dir.path().join("out").join("rmat15_summary.json").exists());
}

//! End-to-end dispatcher tests driven entirely against the in-memory
//! `FakeController`, so no real `schedtool`/`python` binaries are needed.

use std::io::Write;
use std::sync::Arc;

use sched_harness::domain::Action;
use sched_harness::process::testsupport::FakeController;
use sched_harness::process::PriorityController;
use sched_harness::scheduler::{dispatch, DispatchInputs, Policy};
use sched_harness::sink::ResultSink;
use sched_harness::tla::{TlaConfig, TlaState};
use sched_harness::trace;

fn action(id: u32, job_name: &str, start_ms: u64) -> Action {
    Action { id, job_name: job_name.to_string(), exec: "fib.py".to_string(), para: 10, start_ms }
}

#[test]
fn sfs_dispatches_two_simultaneous_arrivals_onto_two_cores() {
    let trace = vec![action(0, "j0", 0), action(1, "j1", 0)];
    let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
    for a in &trace {
        arr_tx.send(a.clone()).unwrap();
    }
    drop(arr_tx);

    let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
    let dir = tempfile::tempdir().unwrap();
    let sink = ResultSink::new(dir.path(), "sfs");

    let result = dispatch(DispatchInputs {
        policy: Policy::Sfs,
        trace: &trace,
        arrivals: arr_rx,
        controller,
        cores: 2,
        optimal_path: std::path::Path::new("optimal.txt"),
        sink: &sink,
        tla: None,
    });
    assert!(result.is_ok());

    let log = std::fs::read_to_string(dir.path().join("sfs.txt")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3, "two TIME lines plus the shutdown line, got: {log}");
    assert!(lines[2].starts_with("All sfs requests are served"));
}

#[test]
fn sfs_queues_the_second_arrival_on_a_single_core() {
    let trace = vec![action(0, "j0", 0), action(1, "j1", 1)];
    let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
    for a in &trace {
        arr_tx.send(a.clone()).unwrap();
    }
    drop(arr_tx);

    let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
    let dir = tempfile::tempdir().unwrap();
    let sink = ResultSink::new(dir.path(), "sfs");

    let result = dispatch(DispatchInputs {
        policy: Policy::Sfs,
        trace: &trace,
        arrivals: arr_rx,
        controller,
        cores: 1,
        optimal_path: std::path::Path::new("optimal.txt"),
        sink: &sink,
        tla: None,
    });
    assert!(result.is_ok());

    let log = std::fs::read_to_string(dir.path().join("sfs.txt")).unwrap();
    assert!(log.contains("Request#1"));
    assert!(log.contains("Request#2"));
}

#[test]
fn a_fatal_child_exit_is_reported_without_corrupting_the_rest_of_the_run() {
    let trace = vec![action(0, "j0", 0), action(1, "j1", 0), action(2, "j2", 0)];
    let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
    for a in &trace {
        arr_tx.send(a.clone()).unwrap();
    }
    drop(arr_tx);

    let controller: Arc<dyn PriorityController> = Arc::new(FakeController::failing(2));
    let dir = tempfile::tempdir().unwrap();
    let sink = ResultSink::new(dir.path(), "cfs");

    let result = dispatch(DispatchInputs {
        policy: Policy::Cfs,
        trace: &trace,
        arrivals: arr_rx,
        controller,
        cores: 4,
        optimal_path: std::path::Path::new("optimal.txt"),
        sink: &sink,
        tla: None,
    });
    assert!(result.is_err());
}

#[test]
fn trace_driver_feeds_the_dispatcher_from_a_real_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "0,j0,fib.py,10,0").unwrap();
    writeln!(file, "1,j1,fib.py,10,0").unwrap();
    let parsed = trace::load_trace(file.path()).unwrap();
    assert_eq!(parsed.len(), 2);

    let (arr_tx, arr_rx) = crossbeam_channel::bounded(parsed.len());
    let driver_trace = parsed.clone();
    let handle = std::thread::spawn(move || trace::drive_trace(&driver_trace, &arr_tx));

    let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
    let dir = tempfile::tempdir().unwrap();
    let sink = ResultSink::new(dir.path(), "fifo");

    let result = dispatch(DispatchInputs {
        policy: Policy::Fifo,
        trace: &parsed,
        arrivals: arr_rx,
        controller,
        cores: 4,
        optimal_path: std::path::Path::new("optimal.txt"),
        sink: &sink,
        tla: None,
    });
    handle.join().unwrap();
    assert!(result.is_ok());
}

#[test]
fn tla_sfs_runs_the_estimator_and_monitor_alongside_sfs() {
    let trace: Vec<Action> = (0..6).map(|id| action(id, "burst", 0)).collect();
    let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
    for a in &trace {
        arr_tx.send(a.clone()).unwrap();
    }
    drop(arr_tx);

    let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
    let dir = tempfile::tempdir().unwrap();
    let sink = ResultSink::new(dir.path(), "tla");
    let tla = TlaState::new(TlaConfig { monitor_interval_ms: 5, ..TlaConfig::default() });

    let result = dispatch(DispatchInputs {
        policy: Policy::TlaSfs,
        trace: &trace,
        arrivals: arr_rx,
        controller,
        cores: 2,
        optimal_path: std::path::Path::new("optimal.txt"),
        sink: &sink,
        tla: Some(tla),
    });
    assert!(result.is_ok());

    let log = std::fs::read_to_string(dir.path().join("tla.txt")).unwrap();
    let time_lines = log.lines().filter(|l| l.starts_with("TIME:")).count();
    assert_eq!(time_lines, 6);
    assert!(log.lines().last().unwrap().starts_with("All tla requests are served"));
}

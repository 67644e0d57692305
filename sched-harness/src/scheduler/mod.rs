//! Policy Dispatch: select one of the six scheduling policies and wire the
//! trace arrivals, the launchers, the completion bus, the result sink and
//! (in TLA-SFS) the tail monitor together (§4.2).

mod cfs;
mod common;
mod fifo;
mod rr;
mod sfs;
mod stcf;

use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;

use crate::bus::CompletionBus;
use crate::domain::{Action, CoreMask, SchedulerError};
use crate::process::{JobStartObserver, NoopJobStartObserver, PriorityController};
use crate::sink::ResultSink;
use crate::tla::{TailMonitor, TlaState};

/// The six scheduling policies selectable via `-p` (§4.2, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Sfs,
    Cfs,
    Fifo,
    Rr,
    Stcf,
    TlaSfs,
}

impl Policy {
    /// Parse the `-p` flag value. Mirrors §6's flag table exactly.
    ///
    /// # Errors
    /// Returns `SchedulerError::UnknownPolicy` for any other value.
    pub fn parse(flag: &str) -> Result<Self, SchedulerError> {
        match flag {
            "m" => Ok(Policy::Sfs),
            "c" => Ok(Policy::Cfs),
            "s" => Ok(Policy::Stcf),
            "f" => Ok(Policy::Fifo),
            "r" => Ok(Policy::Rr),
            "tla" => Ok(Policy::TlaSfs),
            other => Err(SchedulerError::UnknownPolicy(other.to_string())),
        }
    }

    /// Result-log file stem and the string this harness reports in its
    /// shutdown line (`All <label> requests are served.`, §4.7).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Policy::Sfs => "sfs",
            Policy::Cfs => "cfs",
            Policy::Fifo => "fifo",
            Policy::Rr => "rr",
            Policy::Stcf => "stcf",
            Policy::TlaSfs => "tla",
        }
    }
}

/// Everything Policy Dispatch needs to wire one run together.
pub struct DispatchInputs<'a> {
    pub policy: Policy,
    pub trace: &'a [Action],
    pub arrivals: Receiver<Action>,
    pub controller: Arc<dyn PriorityController>,
    pub cores: u32,
    pub optimal_path: &'a Path,
    pub sink: &'a ResultSink,
    pub tla: Option<TlaState>,
}

/// Run the selected policy to completion: dispatch every arrival, drain
/// every completion to the result sink, run the tail monitor alongside in
/// TLA-SFS mode, then write the shutdown line.
///
/// # Errors
/// Returns the first fatal `SchedulerError` raised by any launched job.
/// STCF never fails: it is a logging stub over an external simulator that
/// is out of scope for this harness (§1).
pub fn dispatch(inputs: DispatchInputs<'_>) -> Result<(), SchedulerError> {
    let DispatchInputs { policy, trace, arrivals, controller, cores, optimal_path, sink, tla } = inputs;

    if policy == Policy::Stcf {
        stcf::simulate_schedule(trace, optimal_path, cores);
        sink.write_shutdown(policy.label());
        return Ok(());
    }

    let bus = CompletionBus::new(trace.len());
    let publisher = bus.publisher();
    let completion_rx = bus.receiver();
    let trace_len = trace.len();

    // `bus` itself keeps one more live `Sender` clone beyond the ones
    // handed to launcher threads via `publisher`. A failed job never
    // publishes a completion (sfs.rs/common.rs), so the consumer below
    // can't always expect `trace_len` messages; it instead relies on the
    // channel disconnecting once every sender clone is dropped. Holding
    // `bus` alive across the whole `thread::scope` call below would keep
    // that last clone alive for the entire run and make the consumer
    // block forever waiting for completions that will never come.
    drop(bus);

    let observer: Arc<dyn JobStartObserver> = match &tla {
        Some(state) => Arc::new(state.clone()),
        None => Arc::new(NoopJobStartObserver),
    };

    let result = thread::scope(|scope| {
        let consumer_tla = tla.clone();
        scope.spawn(move || {
            for completion in completion_rx.iter().take(trace_len) {
                sink.write_completion(&completion.job_name, completion.wait_ms, completion.total_ms, completion.seq);
                if let Some(state) = &consumer_tla {
                    state.on_completion(&completion, sink);
                }
            }
        });

        let monitor = tla.as_ref().map(|state| {
            let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
            let tail = TailMonitor::new(state.clone(), Arc::clone(&controller), CoreMask::full(cores));
            let handle = scope.spawn(move || tail.run_until(&stop_rx));
            (stop_tx, handle)
        });

        let dispatch_result = match policy {
            Policy::Sfs | Policy::TlaSfs => {
                sfs::run(trace_len, &arrivals, Arc::clone(&controller), publisher, observer, cores)
            }
            Policy::Cfs => cfs::run(trace_len, &arrivals, Arc::clone(&controller), publisher, observer, cores),
            Policy::Fifo => fifo::run(trace_len, &arrivals, Arc::clone(&controller), publisher, observer),
            Policy::Rr => rr::run(trace_len, &arrivals, Arc::clone(&controller), publisher, observer, cores),
            Policy::Stcf => unreachable!("handled above"),
        };

        if let Some((stop_tx, handle)) = monitor {
            let _ = stop_tx.send(());
            let _ = handle.join();
        }

        dispatch_result
    });

    sink.write_shutdown(policy.label());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_documented_flag() {
        assert_eq!(Policy::parse("m").unwrap(), Policy::Sfs);
        assert_eq!(Policy::parse("c").unwrap(), Policy::Cfs);
        assert_eq!(Policy::parse("s").unwrap(), Policy::Stcf);
        assert_eq!(Policy::parse("f").unwrap(), Policy::Fifo);
        assert_eq!(Policy::parse("r").unwrap(), Policy::Rr);
        assert_eq!(Policy::parse("tla").unwrap(), Policy::TlaSfs);
    }

    #[test]
    fn parse_rejects_unknown_flags() {
        assert!(matches!(Policy::parse("bogus"), Err(SchedulerError::UnknownPolicy(_))));
    }

    #[test]
    fn dispatch_runs_fifo_end_to_end() {
        use crate::domain::Action;
        use crate::process::testsupport::FakeController;

        let trace = vec![
            Action { id: 0, job_name: "a".into(), exec: "fib.py".into(), para: 1, start_ms: 0 },
            Action { id: 1, job_name: "b".into(), exec: "fib.py".into(), para: 1, start_ms: 0 },
        ];
        let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
        for action in &trace {
            arr_tx.send(action.clone()).unwrap();
        }
        drop(arr_tx);

        let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
        let sink = ResultSink::for_test();

        let result = dispatch(DispatchInputs {
            policy: Policy::Fifo,
            trace: &trace,
            arrivals: arr_rx,
            controller,
            cores: 4,
            optimal_path: Path::new("optimal.txt"),
            sink: &sink,
            tla: None,
        });
        assert!(result.is_ok());
    }
}

//! SFS policy (`-p m`, and the core of TLA-SFS): a single dispatcher thread
//! owns a free-core set and a FIFO wait queue (§4.2, §4.3).
//!
//! Tie-breaking in the free-core set is lowest core index; tie-breaking in
//! the wait queue is arrival order. The free-core set is mutated only by
//! the calling (dispatcher) thread — single-writer, per §9.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Select};

use crate::bus::CompletionPublisher;
use crate::domain::{Action, CoreMask, SchedClass, SchedulerError};
use crate::process::{JobStartObserver, PriorityController, ProcessLauncher};

struct CoreFreed {
    core: u32,
}

/// Run the SFS dispatcher loop on the calling thread until every job in
/// `trace` has completed. Intended to be called both for plain SFS and,
/// with a TLA `JobStartObserver`/completion hook layered on top by the
/// caller, for TLA-SFS.
///
/// # Errors
/// Returns the first `SchedulerError` raised by any launched job; the
/// dispatcher keeps running the rest of the trace to completion regardless
/// (mirrors §4.3: a single bad job is fatal to the run's exit code, not to
/// its peers still in flight).
pub fn run(
    trace_len: usize,
    arrivals: &Receiver<Action>,
    controller: Arc<dyn PriorityController>,
    publisher: CompletionPublisher,
    observer: Arc<dyn JobStartObserver>,
    cores: u32,
) -> Result<(), SchedulerError> {
    let (done_tx, done_rx) = crossbeam_channel::bounded::<CoreFreed>(trace_len.max(1));
    let first_error: Arc<Mutex<Option<SchedulerError>>> = Arc::new(Mutex::new(None));

    let mut free_cores: Vec<u32> = (0..cores).collect();
    let mut waiting: Vec<(Action, Instant)> = Vec::new();
    let mut completed = 0usize;
    let mut arrivals_open = true;

    let dispatch = {
        let controller = Arc::clone(&controller);
        let publisher = publisher.clone();
        let observer = Arc::clone(&observer);
        let first_error = Arc::clone(&first_error);
        let done_tx = done_tx.clone();
        move |action: Action, arrival: Instant, core: u32| {
            let controller = Arc::clone(&controller);
            let publisher = publisher.clone();
            let observer = Arc::clone(&observer);
            let first_error = Arc::clone(&first_error);
            let done_tx = done_tx.clone();

            thread::spawn(move || {
                let launcher = ProcessLauncher::new(controller.as_ref());
                match launcher.run(&action, arrival, SchedClass::Normal, CoreMask::single(core), observer.as_ref()) {
                    Ok(completion) => publisher.publish(completion),
                    Err(err) => {
                        let mut guard = first_error.lock().unwrap();
                        if guard.is_none() {
                            *guard = Some(err);
                        }
                    }
                }
                let _ = done_tx.send(CoreFreed { core });
            });
        }
    };

    while completed < trace_len {
        let mut sel = Select::new();
        let arr_idx = if arrivals_open { Some(sel.recv(arrivals)) } else { None };
        let done_idx = sel.recv(&done_rx);
        let oper = sel.select();

        if Some(oper.index()) == arr_idx {
            match oper.recv(arrivals) {
                Ok(action) => {
                    // Capture the arrival instant the moment it's received,
                    // not when a core eventually frees up for it — `wait_ms`
                    // is measured from this point (§4.3: `job.St`), so a
                    // queued job's wait is the gap between the two, not ~0.
                    let arrival = Instant::now();
                    free_cores.sort_unstable();
                    if let Some(core) = free_cores.first().copied() {
                        free_cores.remove(0);
                        dispatch(action, arrival, core);
                    } else {
                        waiting.push((action, arrival));
                    }
                }
                Err(_) => arrivals_open = false,
            }
        } else if oper.index() == done_idx {
            let freed = oper.recv(&done_rx).expect("done sender outlives dispatcher");
            completed += 1;
            if !waiting.is_empty() {
                let (next, arrival) = waiting.remove(0);
                dispatch(next, arrival, freed.core);
            } else {
                free_cores.push(freed.core);
            }
        }
    }

    // Worker threads are fire-and-forget (no `JoinHandle` kept), so other
    // clones of `first_error` may still be unwinding here — read through
    // the mutex instead of `Arc::try_unwrap`-ing it. The error write
    // happens-before its thread's `done_tx.send`, which happens-before the
    // matching `recv` above, so the lock alone is enough synchronization.
    match first_error.lock().unwrap().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, Completion};
    use crate::process::testsupport::FakeController;
    use crate::process::NoopJobStartObserver;
    use crate::bus::CompletionBus;

    fn action(id: u32, start_ms: u64) -> Action {
        Action { id, job_name: format!("j{id}"), exec: "fib.py".to_string(), para: 1, start_ms }
    }

    #[test]
    fn two_jobs_on_two_cores_both_complete_independently() {
        // S1: N=2, two simultaneous arrivals, both dispatched at once.
        let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
        arr_tx.send(action(0, 0)).unwrap();
        arr_tx.send(action(1, 0)).unwrap();
        drop(arr_tx);

        let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
        let bus = CompletionBus::new(4);
        let observer: Arc<dyn JobStartObserver> = Arc::new(NoopJobStartObserver);

        let result = run(2, &arr_rx, controller, bus.publisher(), observer, 2);
        assert!(result.is_ok());

        let rx = bus.receiver();
        let mut completions: Vec<Completion> = (0..2).map(|_| rx.recv().unwrap()).collect();
        completions.sort_by_key(|c| c.id);
        assert_eq!(completions[0].id, 0);
        assert_eq!(completions[1].id, 1);
    }

    #[test]
    fn single_core_queues_the_second_arrival() {
        // S2: N=1, second job must wait for the first to free the core.
        let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
        arr_tx.send(action(0, 0)).unwrap();
        arr_tx.send(action(1, 1)).unwrap();
        drop(arr_tx);

        let controller: Arc<dyn PriorityController> = Arc::new(FakeController::new());
        let bus = CompletionBus::new(4);
        let observer: Arc<dyn JobStartObserver> = Arc::new(NoopJobStartObserver);

        let result = run(2, &arr_rx, controller, bus.publisher(), observer, 1);
        assert!(result.is_ok());

        let rx = bus.receiver();
        let mut completions: Vec<Completion> = (0..2).map(|_| rx.recv().unwrap()).collect();
        let seqs: Vec<u32> = completions.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![1, 2]);

        completions.sort_by_key(|c| c.id);
        assert_eq!(completions[0].id, 0);
        assert_eq!(completions[1].id, 1);
    }

    #[test]
    fn queued_job_wait_ms_reflects_the_full_queueing_delay() {
        // S2 with a measurable hold time: job 1 sits behind job 0's ~30ms
        // run, so its wait_ms must be close to that, not ~0 (the bug this
        // guards against measured `arrival` at dispatch time instead of at
        // the moment the job's arrival was received).
        let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
        arr_tx.send(action(0, 0)).unwrap();
        arr_tx.send(action(1, 0)).unwrap();
        drop(arr_tx);

        let busy = std::time::Duration::from_millis(30);
        let controller: Arc<dyn PriorityController> = Arc::new(FakeController::busy_for(busy));
        let bus = CompletionBus::new(4);
        let observer: Arc<dyn JobStartObserver> = Arc::new(NoopJobStartObserver);

        let result = run(2, &arr_rx, controller, bus.publisher(), observer, 1);
        assert!(result.is_ok());

        let rx = bus.receiver();
        let mut completions: Vec<Completion> = (0..2).map(|_| rx.recv().unwrap()).collect();
        completions.sort_by_key(|c| c.id);

        let queued = &completions[1];
        assert!(
            queued.wait_ms >= busy.as_millis() as u64 / 2,
            "job queued behind a {}ms hold should report a comparable wait_ms, got {}",
            busy.as_millis(),
            queued.wait_ms
        );
    }

    #[test]
    fn a_fatal_child_does_not_stall_the_rest_of_the_trace() {
        let (arr_tx, arr_rx) = crossbeam_channel::unbounded();
        arr_tx.send(action(0, 0)).unwrap();
        arr_tx.send(action(1, 0)).unwrap();
        drop(arr_tx);

        let controller: Arc<dyn PriorityController> = Arc::new(FakeController::failing(1));
        let bus = CompletionBus::new(4);
        let observer: Arc<dyn JobStartObserver> = Arc::new(NoopJobStartObserver);

        let result = run(2, &arr_rx, controller, bus.publisher(), observer, 2);
        assert!(matches!(result, Err(SchedulerError::ChildExited { .. })));
    }
}

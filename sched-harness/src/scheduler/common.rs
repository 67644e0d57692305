//! Shared machinery for the "launch every arrival immediately" policies
//! (CFS, FIFO, RR): they differ only in scheduling class and core mask, so
//! the dispatch loop itself lives here once.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use crossbeam_channel::Receiver;

use crate::bus::CompletionPublisher;
use crate::domain::{Action, CoreMask, SchedClass, SchedulerError};
use crate::process::{JobStartObserver, PriorityController, ProcessLauncher};

/// Spawn a launcher thread per arrival as it comes in, pinned to `mask`
/// under `class`, with no admission control. Blocks until every job in
/// `trace` has completed (or the first fatal child exit is observed).
///
/// # Errors
/// Returns the first `SchedulerError` raised by any launched job.
pub fn run_immediate(
    trace_len: usize,
    arrivals: &Receiver<Action>,
    controller: Arc<dyn PriorityController>,
    publisher: CompletionPublisher,
    observer: Arc<dyn JobStartObserver>,
    class: SchedClass,
    mask: CoreMask,
) -> Result<(), SchedulerError> {
    let first_error: Arc<Mutex<Option<SchedulerError>>> = Arc::new(Mutex::new(None));
    let mut handles = Vec::with_capacity(trace_len);

    for action in arrivals.iter().take(trace_len) {
        let controller = Arc::clone(&controller);
        let publisher = publisher.clone();
        let observer = Arc::clone(&observer);
        let first_error = Arc::clone(&first_error);
        let arrival = Instant::now();

        handles.push(thread::spawn(move || {
            let launcher = ProcessLauncher::new(controller.as_ref());
            match launcher.run(&action, arrival, class, mask, observer.as_ref()) {
                Ok(completion) => publisher.publish(completion),
                Err(err) => {
                    let mut guard = first_error.lock().unwrap();
                    if guard.is_none() {
                        *guard = Some(err);
                    }
                }
            }
        }));
    }

    for handle in handles {
        let _ = handle.join();
    }

    match Arc::try_unwrap(first_error).unwrap().into_inner().unwrap() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

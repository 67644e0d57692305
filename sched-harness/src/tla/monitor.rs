//! Tail Monitor: a ticker thread that scans in-flight jobs and promotes
//! laggards past `1.2 * sloEstimate` to real-time FIFO priority for one
//! slice (§4.5).

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::domain::{CoreMask, SchedClass};
use crate::process::PriorityController;

use super::TlaState;

/// Owns the monitor and promotion threads for one run.
pub struct TailMonitor {
    state: TlaState,
    controller: Arc<dyn PriorityController>,
    full_mask: CoreMask,
}

impl TailMonitor {
    #[must_use]
    pub fn new(state: TlaState, controller: Arc<dyn PriorityController>, full_mask: CoreMask) -> Self {
        Self { state, controller, full_mask }
    }

    /// Run the monitor loop until `stop` fires, blocking the calling thread.
    /// Intended to be spawned on its own `std::thread` by the caller.
    pub fn run_until(&self, stop: &crossbeam_channel::Receiver<()>) {
        let interval = Duration::from_millis(self.state.config().monitor_interval_ms);
        loop {
            match stop.recv_timeout(interval) {
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => return,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => self.tick(),
            }
        }
    }

    fn tick(&self) {
        for pid in self.state.poll_promotions() {
            debug!(
                "promoting pid {pid}: elapsed >= 1.2 * SLO ({} ms)",
                self.state.slo_estimate()
            );
            self.spawn_promotion(pid);
        }
    }

    /// One promotion action, run on its own thread so a slow `schedtool`
    /// invocation never stalls the monitor's ticker (§4.5: "concurrent").
    fn spawn_promotion(&self, pid: i32) {
        let controller = Arc::clone(&self.controller);
        let mask = self.full_mask;
        let slice = Duration::from_millis(
            (self.state.config().slice_mult * self.state.config().ts_ms as f64) as u64,
        );

        thread::spawn(move || {
            controller.set_class(pid, SchedClass::Fifo, mask);
            info!("pid {pid} promoted to real-time FIFO on {}", mask.as_hex());

            thread::sleep(slice);

            if controller.is_alive(pid) {
                controller.set_class(pid, SchedClass::Normal, mask);
                debug!("pid {pid} demoted back to normal class");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobStart;
    use crate::process::JobStartObserver;
    use crate::process::testsupport::FakeController;
    use crate::tla::TlaConfig;
    use std::time::Instant;

    #[test]
    fn promotes_a_job_that_overstays_its_welcome() {
        let config = TlaConfig { monitor_interval_ms: 5, slice_mult: 1.0, ts_ms: 1, ..TlaConfig::default() };
        let state = TlaState::new(config);
        // Force the SLO estimate down so the threshold is small and fast
        // to cross in a test.
        for _ in 0..5 {
            state.on_completion(
                &crate::domain::Completion {
                    id: 100,
                    job_name: "warmup".to_string(),
                    pid: 1,
                    wait_ms: 0,
                    total_ms: 1,
                    seq: 0,
                },
                &crate::sink::ResultSink::for_test(),
            );
        }

        state.on_job_start(JobStart { id: 1, pid: 4242, start: Instant::now() });

        let controller = Arc::new(FakeController::new());
        let monitor = Arc::new(TailMonitor::new(state, controller.clone(), CoreMask::full(4)));

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let handle = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.run_until(&stop_rx))
        };

        thread::sleep(Duration::from_millis(100));
        let _ = stop_tx.send(());
        handle.join().unwrap();

        assert!(
            !controller.class_changes.lock().unwrap().is_empty(),
            "expected at least one schedtool class change from a promotion"
        );
    }
}

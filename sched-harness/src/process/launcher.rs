//! Process Launcher: spawn one job, wait for exit, timestamp start/end.
//!
//! This is the one place that turns an `Action` into OS-level side effects.
//! Everything it needs to talk to the outside world — spawning, priority
//! changes, liveness checks — goes through the injected `PriorityController`
//! rather than shelling out directly, so it can run under test against a
//! fake.

use std::time::Instant;

use log::debug;

use crate::domain::{Action, Completion, CoreMask, JobStart, SchedClass, SchedulerError};

use super::priority::{ExitOutcome, PriorityController};

/// Observer notified the instant a job's child process starts, before the
/// launcher blocks on `wait()`.
///
/// The original source keyed this off a process-wide singleton
/// (`tlaInstanceGlobal`); here it is an explicit dependency so a non-TLA
/// policy can wire in a no-op and pay nothing for the indirection.
pub trait JobStartObserver: Send + Sync {
    fn on_job_start(&self, start: JobStart);
}

/// Observer that does nothing — used by every policy except TLA-SFS.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopJobStartObserver;

impl JobStartObserver for NoopJobStartObserver {
    fn on_job_start(&self, _start: JobStart) {}
}

/// Launches one job to completion, synchronously, on the calling thread.
///
/// Callers run this on a dedicated thread per in-flight job (§5: "one [thread]
/// per in-flight job").
pub struct ProcessLauncher<'a> {
    controller: &'a dyn PriorityController,
}

impl<'a> ProcessLauncher<'a> {
    #[must_use]
    pub fn new(controller: &'a dyn PriorityController) -> Self {
        Self { controller }
    }

    /// Spawn `action` under `class` pinned to `mask`, block until it exits,
    /// and return the completion record. `arrival` is the wall-clock moment
    /// the job's arrival was announced by the Trace Driver (`job.St` in the
    /// original) — it may precede this call by an admission-queueing delay,
    /// which is exactly what `wait_ms` below reports.
    ///
    /// # Errors
    /// Returns `SchedulerError::SpawnFailed` if the child cannot be spawned,
    /// or `SchedulerError::ChildExited`/`ChildSignaled` on non-zero exit —
    /// both are treated as fatal by the caller (§7).
    pub fn run(
        &self,
        action: &Action,
        arrival: Instant,
        class: SchedClass,
        mask: CoreMask,
        observer: &dyn JobStartObserver,
    ) -> Result<Completion, SchedulerError> {
        let t1 = Instant::now();

        let mut child = self
            .controller
            .spawn(&action.exec, action.para, action.id, class, mask)
            .map_err(|source| SchedulerError::SpawnFailed { id: action.id, source })?;

        let pid = child.pid();
        debug!("job #{} started (pid {pid}) class={:?} mask={}", action.id, class, mask.as_hex());

        observer.on_job_start(JobStart { id: action.id, pid, start: arrival });

        let outcome = child
            .wait()
            .map_err(|source| SchedulerError::SpawnFailed { id: action.id, source })?;

        let t2 = Instant::now();

        match outcome {
            ExitOutcome::Success => {}
            ExitOutcome::Failed(code) => {
                return Err(SchedulerError::ChildExited { id: action.id, code })
            }
            ExitOutcome::Signaled => return Err(SchedulerError::ChildSignaled { id: action.id }),
        }

        Ok(Completion {
            id: action.id,
            job_name: action.job_name.clone(),
            pid,
            wait_ms: t1.saturating_duration_since(arrival).as_millis() as u64,
            total_ms: t2.saturating_duration_since(arrival).as_millis() as u64,
            seq: 0, // assigned by the CompletionBus on publish
        })
    }
}

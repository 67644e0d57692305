//! In-memory `PriorityController` fake, shared by the launcher, scheduler,
//! and TLA test modules. Never compiled into a release binary.

use std::io;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{CoreMask, SchedClass};

use super::priority::{ExitOutcome, ManagedChild, PriorityController};

struct FakeChild {
    pid: i32,
    outcome: ExitOutcome,
    busy: Duration,
}

impl ManagedChild for FakeChild {
    fn pid(&self) -> i32 {
        self.pid
    }

    fn wait(&mut self) -> io::Result<ExitOutcome> {
        if !self.busy.is_zero() {
            std::thread::sleep(self.busy);
        }
        Ok(self.outcome)
    }
}

/// Records every `schedtool` invocation it would have made and hands back
/// a synthetic child with a configurable exit outcome.
pub struct FakeController {
    next_pid: AtomicI32,
    outcome: ExitOutcome,
    busy: Duration,
    last_pid: AtomicI32,
    pub class_changes: Mutex<Vec<(i32, SchedClass, CoreMask)>>,
    pub alive: Mutex<Vec<i32>>,
}

impl FakeController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_pid: AtomicI32::new(1000),
            outcome: ExitOutcome::Success,
            busy: Duration::ZERO,
            last_pid: AtomicI32::new(0),
            class_changes: Mutex::new(Vec::new()),
            alive: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(code: i32) -> Self {
        Self { outcome: ExitOutcome::Failed(code), ..Self::new() }
    }

    /// Make every spawned child block in `wait()` for `duration` before
    /// exiting, so tests can observe a real admission-queueing delay on
    /// whichever job waits behind it.
    #[must_use]
    pub fn busy_for(duration: Duration) -> Self {
        Self { busy: duration, ..Self::new() }
    }

    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    #[must_use]
    pub fn last_pid(&self) -> i32 {
        self.last_pid.load(Ordering::SeqCst)
    }

    /// Mark `pid` as alive for subsequent `is_alive` queries (defaults to
    /// alive for any pid this fake issued unless told otherwise).
    pub fn mark_dead(&self, pid: i32) {
        self.alive.lock().unwrap().retain(|&p| p != pid);
    }
}

impl Default for FakeController {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityController for FakeController {
    fn spawn(
        &self,
        _exec: &str,
        _param: i64,
        _id: u32,
        _class: SchedClass,
        _mask: CoreMask,
    ) -> io::Result<Box<dyn ManagedChild>> {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.last_pid.store(pid, Ordering::SeqCst);
        self.alive.lock().unwrap().push(pid);
        Ok(Box::new(FakeChild { pid, outcome: self.outcome, busy: self.busy }))
    }

    fn set_class(&self, pid: i32, class: SchedClass, mask: CoreMask) {
        self.class_changes.lock().unwrap().push((pid, class, mask));
    }

    fn is_alive(&self, pid: i32) -> bool {
        self.alive.lock().unwrap().contains(&pid)
    }
}

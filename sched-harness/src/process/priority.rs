//! `PriorityController`: the capability seam around `schedtool`/`/proc`.
//!
//! Isolating the external-command coupling behind a trait keeps the tail
//! monitor and launcher unit-testable with an in-memory fake instead of
//! requiring a real `schedtool` binary and real child processes in tests.

use std::io;
use std::process::{Command, Stdio};

use crate::domain::{CoreMask, SchedClass};

/// Outcome of waiting for a managed child to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failed(i32),
    Signaled,
}

/// A spawned job, abstracted away from `std::process::Child` so tests can
/// substitute an in-memory fake instead of spawning a real OS process.
pub trait ManagedChild: Send {
    fn pid(&self) -> i32;

    /// Block until the child exits.
    ///
    /// # Errors
    /// Returns the underlying `io::Error` if the wait syscall itself fails.
    fn wait(&mut self) -> io::Result<ExitOutcome>;
}

/// Spawn/retarget/observe child processes via the OS priority and affinity
/// tools. The production implementation shells out to `schedtool`; tests
/// use an in-memory fake (`process::testsupport::FakeController`).
pub trait PriorityController: Send + Sync {
    /// Spawn `python <exec> <param> <id>` under `schedtool <class> -a <mask>`.
    ///
    /// # Errors
    /// Returns the underlying `io::Error` if `schedtool` cannot be spawned.
    fn spawn(
        &self,
        exec: &str,
        param: i64,
        id: u32,
        class: SchedClass,
        mask: CoreMask,
    ) -> io::Result<Box<dyn ManagedChild>>;

    /// Elevate or demote an already-running pid to `class` on `mask`.
    /// Best-effort: failures are the caller's responsibility to ignore.
    fn set_class(&self, pid: i32, class: SchedClass, mask: CoreMask);

    /// Whether `pid` still exists and is not a zombie.
    fn is_alive(&self, pid: i32) -> bool;
}

struct RealChild(std::process::Child);

impl ManagedChild for RealChild {
    fn pid(&self) -> i32 {
        self.0.id() as i32
    }

    fn wait(&mut self) -> io::Result<ExitOutcome> {
        let status = self.0.wait()?;
        Ok(if status.success() {
            ExitOutcome::Success
        } else {
            match status.code() {
                Some(code) => ExitOutcome::Failed(code),
                None => ExitOutcome::Signaled,
            }
        })
    }
}

/// Production `PriorityController` backed by the real `schedtool` binary
/// and `/proc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchedtoolController;

impl PriorityController for SchedtoolController {
    fn spawn(
        &self,
        exec: &str,
        param: i64,
        id: u32,
        class: SchedClass,
        mask: CoreMask,
    ) -> io::Result<Box<dyn ManagedChild>> {
        let mut cmd = Command::new("schedtool");
        cmd.args(class.schedtool_args())
            .arg("-a")
            .arg(mask.as_hex())
            .arg("-e")
            .arg("python")
            .arg(exec)
            .arg(param.to_string())
            .arg(id.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let child = cmd.spawn()?;
        Ok(Box::new(RealChild(child)))
    }

    fn set_class(&self, pid: i32, class: SchedClass, mask: CoreMask) {
        let _ = Command::new("schedtool")
            .args(class.schedtool_args())
            .arg("-a")
            .arg(mask.as_hex())
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }

    fn is_alive(&self, pid: i32) -> bool {
        let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
            return false;
        };
        // Format: "pid (comm) state ..."; the state char follows the closing paren.
        stat.rfind(')')
            .and_then(|close| stat[close + 1..].trim_start().chars().next())
            .is_some_and(|state| state != 'Z')
    }
}

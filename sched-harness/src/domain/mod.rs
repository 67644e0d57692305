//! Core data types shared across the dispatcher, launcher, and TLA monitor.

mod errors;

pub use errors::{SchedulerError, TraceError};

use std::time::Instant;

/// A single trace entry: an immutable job arrival.
///
/// Mirrors the original `Action{Id, JobName, Exec, Para, Start}` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: u32,
    pub job_name: String,
    pub exec: String,
    pub para: i64,
    pub start_ms: u64,
}

/// Scheduling class requested for a launched job.
///
/// Corresponds to the `classFlag` passed to `schedtool`: `-N` (normal),
/// `-F -p 20` (real-time FIFO) or `-R -p 20` (real-time round-robin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedClass {
    Normal,
    Fifo,
    RoundRobin,
}

impl SchedClass {
    /// `schedtool` argv fragment for this class, e.g. `["-F", "-p", "20"]`.
    #[must_use]
    pub fn schedtool_args(self) -> Vec<String> {
        match self {
            SchedClass::Normal => vec!["-N".to_string()],
            SchedClass::Fifo => vec!["-F".to_string(), "-p".to_string(), "20".to_string()],
            SchedClass::RoundRobin => vec!["-R".to_string(), "-p".to_string(), "20".to_string()],
        }
    }
}

/// A CPU core mask, stored as the hex string `schedtool -a` expects
/// (e.g. `"0xff"`) together with the numeric value for bit-level ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreMask(u64);

impl CoreMask {
    #[must_use]
    pub fn single(core: u32) -> Self {
        CoreMask(1u64 << core)
    }

    #[must_use]
    pub fn full(cores: u32) -> Self {
        if cores >= 64 {
            CoreMask(u64::MAX)
        } else {
            CoreMask((1u64 << cores) - 1)
        }
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

/// The completion record published by a `ProcessLauncher` once a job's
/// child process exits successfully.
///
/// `seq` is the monotonically increasing, dense request index (§8.3 of the
/// spec); it is assigned by the `CompletionBus`, not by the launcher.
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: u32,
    pub job_name: String,
    pub pid: i32,
    pub wait_ms: u64,
    pub total_ms: u64,
    pub seq: u32,
}

/// Wall-clock start record published the moment a job's child process is
/// spawned, before `wait()` blocks. Consumed by the TLA monitor to seed a
/// `JobState`.
#[derive(Debug, Clone, Copy)]
pub struct JobStart {
    pub id: u32,
    pub pid: i32,
    pub start: Instant,
}

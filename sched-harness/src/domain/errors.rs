//! Structured error types for the scheduler harness.
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("trace file {path}: line {line_no}: malformed entry: {text}")]
    MalformedLine { path: String, line_no: usize, text: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("job #{id}: failed to spawn workload: {source}")]
    SpawnFailed { id: u32, source: std::io::Error },

    #[error("job #{id}: child exited with status {code}")]
    ChildExited { id: u32, code: i32 },

    #[error("job #{id}: child terminated by signal")]
    ChildSignaled { id: u32 },

    #[error("unknown policy flag: {0}")]
    UnknownPolicy(String),
}

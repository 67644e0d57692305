//! Process Launcher and the `PriorityController` capability it spawns jobs
//! through.

pub mod launcher;
pub mod priority;

#[cfg(any(test, feature = "test-util"))]
pub mod testsupport;

pub use launcher::{JobStartObserver, NoopJobStartObserver, ProcessLauncher};
pub use priority::{ExitOutcome, ManagedChild, PriorityController, SchedtoolController};

//! Round-robin policy (`-p r`): every arrival launched immediately under
//! real-time round-robin priority 20, pinned to the full core mask (§4.2).

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::bus::CompletionPublisher;
use crate::domain::{Action, CoreMask, SchedClass, SchedulerError};
use crate::process::{JobStartObserver, PriorityController};

use super::common::run_immediate;

pub fn run(
    trace_len: usize,
    arrivals: &Receiver<Action>,
    controller: Arc<dyn PriorityController>,
    publisher: CompletionPublisher,
    observer: Arc<dyn JobStartObserver>,
    cores: u32,
) -> Result<(), SchedulerError> {
    run_immediate(
        trace_len,
        arrivals,
        controller,
        publisher,
        observer,
        SchedClass::RoundRobin,
        CoreMask::full(cores),
    )
}

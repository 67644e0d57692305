//! CFS policy (`-p c`): every arrival launched immediately under the normal
//! scheduling class, pinned to the full core mask; the kernel's own
//! completely-fair scheduler handles multiplexing (§4.2).

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
        SchedClass::Normal,
        CoreMask::full(cores),
    )
}

//! FIFO policy (`-p f`): every arrival launched immediately under real-time
//! FIFO priority 20, pinned to core `0x1`. No admission control (§4.2).

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
) -> Result<(), SchedulerError> {
    run_immediate(
        trace_len,
        arrivals,
        controller,
        publisher,
        observer,
        SchedClass::Fifo,
        CoreMask::single(0),
    )
}

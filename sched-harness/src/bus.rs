//! Completion Bus: a bounded channel carrying completion records from every
//! Launcher to whichever consumers are subscribed (always the Result Sink;
//! additionally the SLO Estimator in TLA mode).
//!
//! The sequence number is a lock-free counter owned by the bus itself
//! (§9: "the global sequence number becomes a lock-free counter owned by
//! the Completion Bus"), assigned atomically at publish time so it stays
//! strictly increasing and dense even when launchers run concurrently on
//! separate threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::domain::Completion;

/// Minimum channel capacity mandated by §4.6.
const MIN_CAPACITY: usize = 1024;

pub struct CompletionBus {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    seq: Arc<AtomicU32>,
}

impl CompletionBus {
    #[must_use]
    pub fn new(expected_jobs: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(expected_jobs.max(MIN_CAPACITY));
        Self { tx, rx, seq: Arc::new(AtomicU32::new(0)) }
    }

    /// A cloneable handle launchers use to publish completions.
    #[must_use]
    pub fn publisher(&self) -> CompletionPublisher {
        CompletionPublisher { tx: self.tx.clone(), seq: Arc::clone(&self.seq) }
    }

    /// The single consumer end. Only one thread should drain this (§4.6:
    /// "consumed by a single SLO-Estimator consumer"; the sink shares that
    /// same consumer loop rather than racing it for a second receiver).
    #[must_use]
    pub fn receiver(&self) -> Receiver<Completion> {
        self.rx.clone()
    }
}

/// Handle used by launcher threads to publish a completion. Assigning the
/// sequence number here (rather than in the consumer) keeps the numbering
/// tied to actual completion order across cores, per §4.6.
#[derive(Clone)]
pub struct CompletionPublisher {
    tx: Sender<Completion>,
    seq: Arc<AtomicU32>,
}

impl CompletionPublisher {
    /// Assign the next sequence number and publish `completion` (whose
    /// `seq` field is overwritten) onto the bus.
    pub fn publish(&self, mut completion: Completion) {
        completion.seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        // The consumer outlives every launcher thread; a send failure here
        // would indicate the dispatcher shut down mid-flight, which is a
        // logic bug elsewhere, not a recoverable condition for this thread.
        let _ = self.tx.send(completion);
    }
}

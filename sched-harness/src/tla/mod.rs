//! Tail-Latency-Aware (TLA) adjustment layer on top of SFS: a rolling-window
//! SLO estimator plus a ticker that promotes laggard in-flight jobs.

mod estimator;
mod monitor;

pub use estimator::{percentile, SloEstimator};
pub use monitor::TailMonitor;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::info;

use crate::domain::{Completion, JobStart};
use crate::process::JobStartObserver;
use crate::sink::ResultSink;

/// Tunables read once from the `-tla_*` CLI flags (§6).
#[derive(Debug, Clone, Copy)]
pub struct TlaConfig {
    pub alpha: f64,
    pub window: usize,
    pub monitor_interval_ms: u64,
    pub percentile: u32,
    pub slice_mult: f64,
    pub ts_ms: u64,
}

impl Default for TlaConfig {
    fn default() -> Self {
        Self { alpha: 0.10, window: 50, monitor_interval_ms: 25, percentile: 95, slice_mult: 1.2, ts_ms: 6 }
    }
}

/// Promotion threshold multiplier of the current SLO estimate (§4.5:
/// "compute `threshold = floor(1.2 · sloEstimate)`"). This is fixed by the
/// spec, independent of the `-tla_slice` flag, which only scales the
/// promotion task's sleep duration.
const PROMOTION_THRESHOLD_MULT: f64 = 1.2;

/// Per-job bookkeeping the tail monitor scans each tick.
#[derive(Debug, Clone, Copy)]
pub struct JobState {
    pub pid: i32,
    pub start_time: Instant,
    pub finished: bool,
    pub promoted: bool,
}

/// Everything guarded by the single TLA mutex: the rolling windows, the
/// current SLO estimate, and the in-flight job map (§5: "a single mutex
/// guarding `{turnSamples, shortSamples, sloEstimate, jobStates}`").
struct Inner {
    estimator: SloEstimator,
    job_states: HashMap<u32, JobState>,
}

/// Shared TLA state, handed to the launcher (as a `JobStartObserver`), the
/// completion consumer, and the tail monitor. Cheaply `Clone`-able — it is
/// an `Arc` around the mutex-guarded state.
#[derive(Clone)]
pub struct TlaState {
    config: TlaConfig,
    inner: Arc<Mutex<Inner>>,
}

impl TlaState {
    #[must_use]
    pub fn new(config: TlaConfig) -> Self {
        let estimator = SloEstimator::new(config.alpha, config.window, config.percentile, config.ts_ms);
        Self { config, inner: Arc::new(Mutex::new(Inner { estimator, job_states: HashMap::new() })) }
    }

    #[must_use]
    pub fn config(&self) -> TlaConfig {
        self.config
    }

    /// Current SLO estimate, in ms.
    #[must_use]
    pub fn slo_estimate(&self) -> i64 {
        self.inner.lock().unwrap().estimator.slo_estimate()
    }

    /// Feed a completion into the rolling windows and, if the smoothed SLO
    /// changed, log the transition (§4.4 step 5).
    pub fn on_completion(&self, completion: &Completion, sink: &ResultSink) {
        let mut guard = self.inner.lock().unwrap();
        if let Some(state) = guard.job_states.get_mut(&completion.id) {
            state.finished = true;
        }
        if let Some(change) = guard.estimator.record(completion.total_ms as i64) {
            sink.write_slo_change(change.new, change.old, change.pxx, self.config.percentile, completion.seq);
            info!(
                "SLO {} -> {} ms (p{} = {})",
                change.old, change.new, self.config.percentile, change.pxx
            );
        }
    }

    /// Scan every unfinished, not-yet-promoted job and return the pids that
    /// just crossed the promotion threshold, marking them `promoted` so a
    /// later tick never re-promotes them (§8 property 2).
    #[must_use]
    pub fn poll_promotions(&self) -> Vec<i32> {
        let mut guard = self.inner.lock().unwrap();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let threshold_ms = (PROMOTION_THRESHOLD_MULT * guard.estimator.slo_estimate() as f64).floor() as u64;
        let now = Instant::now();

        let mut promote = Vec::new();
        for state in guard.job_states.values_mut() {
            if state.finished || state.promoted {
                continue;
            }
            let elapsed_ms = now.duration_since(state.start_time).as_millis() as u64;
            if elapsed_ms >= threshold_ms {
                state.promoted = true;
                promote.push(state.pid);
            }
        }
        promote
    }
}

impl JobStartObserver for TlaState {
    fn on_job_start(&self, start: JobStart) {
        let mut guard = self.inner.lock().unwrap();
        guard.job_states.entry(start.id).or_insert(JobState {
            pid: start.pid,
            start_time: start.start,
            finished: false,
            promoted: false,
        });
    }
}

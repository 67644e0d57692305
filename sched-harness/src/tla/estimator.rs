//! Rolling-window percentile estimator with exponential smoothing (§4.4).

use std::collections::VecDeque;

/// Rank-based percentile: sort ascending, take index `floor(n*pct/100)-1`,
/// clamped to 0. This is a rank definition, not linear interpolation —
/// matching the original's `quickSort` + integer-index lookup.
#[must_use]
pub fn percentile(samples: &[i64], pct: u32) -> i64 {
    if samples.is_empty() {
        return 0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = ((sorted.len() as f64 * f64::from(pct) / 100.0).floor() as i64 - 1).max(0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Result of a `SloEstimator::record` call that changed the estimate,
/// ready to hand to the Result Sink's SLO-change log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SloChange {
    pub old: i64,
    pub new: i64,
    pub pxx: i64,
}

/// Maintains the two bounded rolling windows and the smoothed SLO estimate
/// (§3, §4.4). Not thread-safe on its own — callers serialize access via
/// `TlaState`'s mutex.
pub struct SloEstimator {
    alpha: f64,
    capacity: usize,
    pct: u32,
    short_threshold_ms: i64,
    turn_samples: VecDeque<i64>,
    short_samples: VecDeque<i64>,
    slo_estimate: i64,
}

impl SloEstimator {
    #[must_use]
    pub fn new(alpha: f64, capacity: usize, pct: u32, ts_ms: u64) -> Self {
        Self {
            alpha,
            capacity,
            pct,
            short_threshold_ms: 2 * ts_ms as i64,
            turn_samples: VecDeque::with_capacity(capacity),
            short_samples: VecDeque::with_capacity(capacity),
            slo_estimate: 2 * ts_ms as i64,
        }
    }

    #[must_use]
    pub fn slo_estimate(&self) -> i64 {
        self.slo_estimate
    }

    #[must_use]
    pub fn turn_samples(&self) -> &VecDeque<i64> {
        &self.turn_samples
    }

    #[must_use]
    pub fn short_samples(&self) -> &VecDeque<i64> {
        &self.short_samples
    }

    /// Record one completion's turnaround and recompute the SLO estimate.
    /// Returns `Some(change)` only when the smoothed value actually moved
    /// (§4.4 step 5: "if `new != old` update and log").
    pub fn record(&mut self, turnaround_ms: i64) -> Option<SloChange> {
        self.turn_samples.push_back(turnaround_ms);
        if self.turn_samples.len() > self.capacity {
            self.turn_samples.pop_front();
        }
        if turnaround_ms <= self.short_threshold_ms {
            self.short_samples.push_back(turnaround_ms);
            if self.short_samples.len() > self.capacity {
                self.short_samples.pop_front();
            }
        }

        let base: Vec<i64> = if self.short_samples.is_empty() {
            self.turn_samples.iter().copied().collect()
        } else {
            self.short_samples.iter().copied().collect()
        };
        let pxx = percentile(&base, self.pct);

        let old = self.slo_estimate;
        #[allow(clippy::cast_possible_truncation)]
        let new = (self.alpha * pxx as f64 + (1.0 - self.alpha) * old as f64).round() as i64;

        if new == old {
            None
        } else {
            self.slo_estimate = new;
            Some(SloChange { old, new, pxx })
        }
    }
}

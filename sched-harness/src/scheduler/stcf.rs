//! STCF policy (`-p s`, the default): an oracular offline schedule driven
//! by a pre-computed `optimal.txt` ordering and an external simulator.
//!
//! The simulator itself is out of scope (§1: "treated as a black box") —
//! this is a thin stub that logs the inputs it would hand off and returns,
//! rather than shipping a solver nobody asked for.

use std::path::Path;

use log::info;

use crate::domain::Action;

/// Hand `trace` and the optimal ordering at `optimal_path` to the (absent)
/// external simulator. Always succeeds; a missing or unreadable
/// `optimal_path` is logged, not treated as fatal, since this path never
/// actually schedules anything in this harness.
pub fn simulate_schedule(trace: &[Action], optimal_path: &Path, cores: u32) {
    match std::fs::read_to_string(optimal_path) {
        Ok(contents) => {
            let order_len = contents.lines().filter(|l| !l.trim().is_empty()).count();
            info!(
                "STCF: would simulate {} jobs against {order_len}-entry optimal ordering on {cores} cores",
                trace.len()
            );
        }
        Err(err) => {
            info!(
                "STCF: optimal ordering file {} unavailable ({err}); nothing to simulate",
                optimal_path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optimal_file_does_not_panic() {
        let trace = vec![];
        simulate_schedule(&trace, Path::new("/nonexistent/optimal.txt"), 4);
    }
}

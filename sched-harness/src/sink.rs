//! Result Sink: appends per-completion and SLO-change lines to a
//! policy-specific log file (§4.7).
//!
//! Each append opens, writes, and closes the file handle — no shared FD is
//! held across writes (§5), so concurrent launcher threads calling
//! `write_completion` never contend on anything beyond the OS's own
//! append-mode write ordering.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

/// Default root the original hard-codes (`/result/<policy>.txt`).
pub const DEFAULT_RESULT_DIR: &str = "/result";

pub struct ResultSink {
    path: Option<PathBuf>,
}

impl ResultSink {
    /// Build a sink appending to `<result_dir>/<policy>.txt`, creating the
    /// directory and file if they do not already exist.
    #[must_use]
    pub fn new(result_dir: &Path, policy: &str) -> Self {
        if let Err(err) = std::fs::create_dir_all(result_dir) {
            warn!("could not create result directory {}: {err}", result_dir.display());
        }
        Self { path: Some(result_dir.join(format!("{policy}.txt"))) }
    }

    /// A sink that discards every write — used where a caller needs a
    /// `ResultSink` but isn't exercising sink behavior (unit tests for
    /// other components).
    #[must_use]
    pub fn for_test() -> Self {
        Self { path: None }
    }

    fn append(&self, line: &str) {
        let Some(path) = &self.path else { return };
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(mut file) => {
                if let Err(err) = writeln!(file, "{line}") {
                    warn!("failed to write result log {}: {err}", path.display());
                }
            }
            Err(err) => warn!("failed to open result log {}: {err}", path.display()),
        }
    }

    /// `TIME: <job> <wait_ms> <total_ms> Request#<seq>` (§4.7).
    pub fn write_completion(&self, job_name: &str, wait_ms: u64, total_ms: u64, seq: u32) {
        self.append(&format!("TIME: {job_name} {wait_ms} {total_ms} Request#{seq}"));
    }

    /// `[TLA] SLO→<new> ms (old <old>, p<pct>=<pxx>) after Req#<seq>` (§4.7).
    pub fn write_slo_change(&self, new: i64, old: i64, pxx: i64, pct: u32, seq: u32) {
        self.append(&format!("[TLA] SLO\u{2192}{new} ms (old {old}, p{pct}={pxx}) after Req#{seq}"));
    }

    /// `All <policy> requests are served.` (§4.7).
    pub fn write_shutdown(&self, policy: &str) {
        self.append(&format!("All {policy} requests are served."));
    }
}

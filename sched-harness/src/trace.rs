//! Trace file parsing and the Trace Driver that re-emits arrivals in real
//! time (§4.1).
//!
//! The loader itself is an out-of-scope external collaborator per the
//! spec's framing — it carries no scheduling logic — but something has to
//! produce `Action` values from the on-disk format described in §6, so a
//! conforming parser lives here rather than being hand-waved away.

use std::path::Path;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::debug;

use crate::domain::{Action, TraceError};

/// Parse the trace file format from §6: one job per line, fields
/// `id, jobName, exec, para, startMs`, comma- or whitespace-separated.
/// Blank lines and `#`-prefixed comments are skipped. The trace is
/// expected sorted ascending by `startMs`; this function does not
/// re-sort it, since a loader that silently reorders jobs would hide a
/// malformed trace rather than surfacing it.
///
/// # Errors
/// Returns `TraceError::MalformedLine` on the first line that doesn't
/// parse, and `TraceError::Io` if the file cannot be read.
pub fn load_trace(path: &Path) -> Result<Vec<Action>, TraceError> {
    let text = std::fs::read_to_string(path)?;
    let mut actions = Vec::new();

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split([',', ' ', '\t']).filter(|f| !f.is_empty()).collect();
        let malformed = || TraceError::MalformedLine {
            path: path.display().to_string(),
            line_no: line_no + 1,
            text: line.to_string(),
        };

        if fields.len() != 5 {
            return Err(malformed());
        }

        let id: u32 = fields[0].parse().map_err(|_| malformed())?;
        let job_name = fields[1].to_string();
        let exec = fields[2].to_string();
        let para: i64 = fields[3].parse().map_err(|_| malformed())?;
        let start_ms: u64 = fields[4].parse().map_err(|_| malformed())?;

        actions.push(Action { id, job_name, exec, para, start_ms });
    }

    Ok(actions)
}

/// Re-emits trace arrivals at their recorded inter-arrival spacing onto
/// `arrivals`, then returns once the last arrival has been sent (§4.1).
///
/// Runs on its own thread; the channel must be sized to absorb the whole
/// trace at once since there is no back-pressure on the dispatcher.
pub fn drive_trace(trace: &[Action], arrivals: &Sender<Action>) {
    for (i, action) in trace.iter().enumerate() {
        debug!("arrival: job #{} ({}) at t={}ms", action.id, action.job_name, action.start_ms);
        let _ = arrivals.send(action.clone());

        if let Some(next) = trace.get(i + 1) {
            let gap_ms = next.start_ms.saturating_sub(action.start_ms);
            if gap_ms > 0 {
                std::thread::sleep(Duration::from_millis(gap_ms));
            }
        }
    }
}

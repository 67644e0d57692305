//! Pre-flight checks for sched-harness.
//!
//! Validates system requirements before spawning any job, and raises the
//! open-file-descriptor limit so a trace with many concurrent jobs doesn't
//! run the harness itself out of file descriptors (§5, §7).

#![allow(unsafe_code)] // setrlimit()/geteuid() require unsafe

use log::warn;

/// Target open-file-descriptor limit, soft and hard, to accommodate many
/// concurrent child processes and their pipes (§5).
const TARGET_NOFILE: u64 = 1_024_000;

/// Run all pre-flight checks before the trace driver starts.
pub fn run_preflight_checks() {
    warn_if_not_root();
    raise_nofile_limit();
}

/// `schedtool`'s real-time classes (`-F`, `-R`) require root; this is a
/// warning, not a hard failure, since CFS/FIFO-as-normal-class runs are
/// still meaningful without it.
fn warn_if_not_root() {
    // SAFETY: `geteuid` takes no arguments and cannot fail.
    if unsafe { libc::geteuid() } != 0 {
        warn!("not running as root: schedtool real-time priority changes will likely fail");
    }
}

/// Best-effort raise of `RLIMIT_NOFILE` to `TARGET_NOFILE` soft/hard (§5,
/// §7: "logged, continue" on failure).
fn raise_nofile_limit() {
    let raised = libc::rlimit { rlim_cur: TARGET_NOFILE, rlim_max: TARGET_NOFILE };

    // SAFETY: `raised` is a valid, fully-initialized `libc::rlimit`.
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &raised) } != 0 {
        warn!(
            "failed to raise RLIMIT_NOFILE to {TARGET_NOFILE}: {}",
            std::io::Error::last_os_error()
        );
    }
}

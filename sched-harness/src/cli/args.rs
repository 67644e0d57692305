//! CLI argument definitions (§6).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sched-harness",
    about = "Arrival-driven CPU scheduling harness over schedtool-pinned child processes",
    after_help = "\
EXAMPLES:
    sudo sched-harness -t trace.txt -p m -n 16          Run SFS over a trace on 16 cores
    sudo sched-harness -t trace.txt -p tla -tla_pct 99   Run TLA-SFS with a tighter tail target
    sudo sched-harness -t trace.txt -p s -o optimal.txt  Run the STCF offline policy"
)]
pub struct Args {
    /// Scheduling policy: m=SFS, c=CFS, s=STCF, f=FIFO, r=RR, tla=TLA-SFS
    #[arg(short = 'p', long = "policy", default_value = "m")]
    pub policy: String,

    /// Trace file to drive arrivals from
    #[arg(short = 't', long = "trace", default_value = "")]
    pub trace: PathBuf,

    /// STCF optimal ordering file
    #[arg(short = 'o', long = "optimal", default_value = "optimal.txt")]
    pub optimal: PathBuf,

    /// Number of CPU cores to schedule across
    #[arg(short = 'n', long = "cores", default_value_t = 16)]
    pub cores: u32,

    /// TLA smoothing factor alpha, in 0..1
    #[arg(long = "tla_alpha", default_value_t = 0.10)]
    pub tla_alpha: f64,

    /// TLA rolling window size
    #[arg(long = "tla_win", default_value_t = 50)]
    pub tla_win: usize,

    /// TLA monitor tick period, in ms
    #[arg(long = "tla_int", default_value_t = 25)]
    pub tla_int: u64,

    /// TLA percentile target, 80..=99
    #[arg(long = "tla_pct", default_value_t = 95, value_parser = clap::value_parser!(u32).range(80..=99))]
    pub tla_pct: u32,

    /// TLA promotion-slice multiplier of Ts
    #[arg(long = "tla_slice", default_value_t = 1.2)]
    pub tla_slice: f64,

    /// Base time-slice Ts, in ms
    #[arg(long = "tla_ts", default_value_t = 6)]
    pub tla_ts: u64,

    /// Root directory for policy result log files
    #[arg(long = "result-dir", default_value = crate::sink::DEFAULT_RESULT_DIR)]
    pub result_dir: PathBuf,

    /// Suppress non-essential stdout narration
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

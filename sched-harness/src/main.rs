use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use sched_harness::cli::Args;
use sched_harness::preflight;
use sched_harness::process::{PriorityController, SchedtoolController};
use sched_harness::scheduler::{self, DispatchInputs, Policy};
use sched_harness::sink::ResultSink;
use sched_harness::tla::{TlaConfig, TlaState};
use sched_harness::trace;

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    preflight::run_preflight_checks();

    let policy = Policy::parse(&args.policy).context("invalid -p/--policy flag")?;

    if !args.quiet {
        println!("sched-harness: policy={} cores={}", policy.label(), args.cores);
    }

    let trace_entries = trace::load_trace(&args.trace)
        .with_context(|| format!("failed to load trace file {}", args.trace.display()))?;
    info!("loaded {} trace entries from {}", trace_entries.len(), args.trace.display());

    let controller: Arc<dyn PriorityController> = Arc::new(SchedtoolController);
    let sink = ResultSink::new(&args.result_dir, policy.label());

    let tla = (policy == Policy::TlaSfs).then(|| {
        TlaState::new(TlaConfig {
            alpha: args.tla_alpha,
            window: args.tla_win,
            monitor_interval_ms: args.tla_int,
            percentile: args.tla_pct,
            slice_mult: args.tla_slice,
            ts_ms: args.tla_ts,
        })
    });

    let (arrival_tx, arrival_rx) = crossbeam_channel::bounded(trace_entries.len().max(1));
    let driver_trace = trace_entries.clone();
    let driver_handle = std::thread::spawn(move || trace::drive_trace(&driver_trace, &arrival_tx));

    let result = scheduler::dispatch(DispatchInputs {
        policy,
        trace: &trace_entries,
        arrivals: arrival_rx,
        controller,
        cores: args.cores,
        optimal_path: &args.optimal,
        sink: &sink,
        tla,
    });

    driver_handle.join().expect("trace driver thread panicked");

    result.context("a scheduled job exited non-zero or was signaled")
}

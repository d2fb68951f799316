// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sysmon-probe - print the counters the monitoring service reports,
//! straight from the local system.
//!
//! Useful to sanity-check what a remote client should be seeing.

use clap::{Parser, Subcommand};
use std::thread;
use std::time::Duration;
use sysmon::probe::{CpuProbe, CpuTimes, MemProbe, ProcStatProbe, ProbeError, SysinfoMemProbe};

/// Inspect local memory and CPU counters
#[derive(Parser, Debug)]
#[command(name = "sysmon-probe")]
#[command(version = "0.1.0")]
#[command(about = "Print local memory and CPU usage")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print total and free RAM in kilobytes
    Mem,
    /// Measure CPU utilization over a sampling interval
    Cpu {
        /// Interval between the two snapshots, in seconds
        #[arg(short, long, default_value = "2")]
        interval: u64,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args.cmd) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cmd: &Cmd) -> Result<(), ProbeError> {
    match cmd {
        Cmd::Mem => {
            let report = SysinfoMemProbe.sample()?;
            println!("total RAM: {} KB", report.total_kb);
            println!("free RAM:  {} KB", report.free_kb);
        }
        Cmd::Cpu { interval } => {
            let probe = ProcStatProbe::new();
            let first = probe.sample()?;
            thread::sleep(Duration::from_secs(*interval));
            let second = probe.sample()?;
            let usage = CpuTimes::usage_between(&first, &second);
            println!("CPU usage over {}s: {:.1}%", interval, usage);
        }
    }
    Ok(())
}

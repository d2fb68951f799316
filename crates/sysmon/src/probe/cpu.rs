// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CPU-time counters from `/proc/stat`.
//!
//! Only the aggregate `cpu` line is read, and only its first four fields
//! (user, nice, system, idle jiffies). Utilization over a window is
//! `100 * (1 - Δidle / Δtotal)`.

use super::{CpuProbe, ProbeError, ProbeResult};
use std::fs;
use std::path::PathBuf;

/// One snapshot of the aggregate jiffy counters.
///
/// Counters are cumulative since boot and only ever grow under normal
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuTimes {
    pub const fn new(user: u64, nice: u64, system: u64, idle: u64) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
        }
    }

    /// Sum of all accounted jiffies in this snapshot. Saturates instead
    /// of overflowing on absurdly large counters.
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
    }

    /// Utilization percentage between two snapshots.
    ///
    /// A zero total delta (two reads inside one tick, or a stalled
    /// counter source) is defined to be 0.0 rather than a division by
    /// zero.
    pub fn usage_between(first: &CpuTimes, second: &CpuTimes) -> f64 {
        let delta_total = second.total().saturating_sub(first.total());
        if delta_total == 0 {
            return 0.0;
        }
        let delta_idle = second.idle.saturating_sub(first.idle);
        100.0 * (1.0 - delta_idle as f64 / delta_total as f64)
    }
}

/// Parse the aggregate `cpu` line out of `/proc/stat`-format text.
pub fn parse_proc_stat(text: &str) -> ProbeResult<CpuTimes> {
    let line = text
        .lines()
        .find(|l| l.starts_with("cpu ") || l.starts_with("cpu\t"))
        .ok_or_else(|| ProbeError::Malformed("no aggregate 'cpu' line".to_string()))?;

    let mut fields = line.split_whitespace().skip(1);
    let mut next = |name: &str| -> ProbeResult<u64> {
        fields
            .next()
            .ok_or_else(|| ProbeError::Malformed(format!("missing '{}' field", name)))?
            .parse::<u64>()
            .map_err(|_| ProbeError::Malformed(format!("non-numeric '{}' field", name)))
    };

    Ok(CpuTimes {
        user: next("user")?,
        nice: next("nice")?,
        system: next("system")?,
        idle: next("idle")?,
    })
}

/// CPU probe reading a `/proc/stat`-format file.
pub struct ProcStatProbe {
    path: PathBuf,
}

impl ProcStatProbe {
    /// Probe the path from [`crate::config::proc_stat_path`].
    pub fn new() -> Self {
        Self {
            path: crate::config::proc_stat_path(),
        }
    }

    /// Probe an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcStatProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuProbe for ProcStatProbe {
    fn sample(&self) -> ProbeResult<CpuTimes> {
        let text = fs::read_to_string(&self.path)?;
        parse_proc_stat(&text)
    }
}

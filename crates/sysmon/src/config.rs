// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time defaults and their environment overrides.
//!
//! Neither program takes command-line flags, so the few runtime knobs are
//! environment variables. Tests use them to shrink the CPU sample window
//! and to point the stat probe at a fixture file.

use std::path::PathBuf;
use std::time::Duration;

/// Default window between the two jiffy snapshots of a CPU-usage request.
pub const DEFAULT_CPU_SAMPLE: Duration = Duration::from_secs(2);

/// Default source of jiffy counters.
pub const PROC_STAT_PATH: &str = "/proc/stat";

/// CPU sample window, overridable with `SYSMON_CPU_SAMPLE_MS`.
///
/// Unparseable values fall back to the default with a warning.
pub fn cpu_sample_interval() -> Duration {
    match std::env::var("SYSMON_CPU_SAMPLE_MS") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                log::warn!(
                    "ignoring SYSMON_CPU_SAMPLE_MS='{}' (not a millisecond count)",
                    raw
                );
                DEFAULT_CPU_SAMPLE
            }
        },
        Err(_) => DEFAULT_CPU_SAMPLE,
    }
}

/// Jiffy counter source, overridable with `SYSMON_PROC_STAT`.
pub fn proc_stat_path() -> PathBuf {
    std::env::var_os("SYSMON_PROC_STAT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(PROC_STAT_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // Env mutation is process-global, so only exercise the default path.
        if std::env::var_os("SYSMON_CPU_SAMPLE_MS").is_none() {
            assert_eq!(cpu_sample_interval(), DEFAULT_CPU_SAMPLE);
        }
        if std::env::var_os("SYSMON_PROC_STAT").is_none() {
            assert_eq!(proc_stat_path(), PathBuf::from("/proc/stat"));
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! System probes behind trait seams.
//!
//! The service handlers talk to [`MemProbe`] and [`CpuProbe`] rather than to
//! the OS directly, so tests can feed canned counters through the same code
//! path the real probes use.

mod cpu;
mod mem;

pub use cpu::{parse_proc_stat, CpuTimes, ProcStatProbe};
pub use mem::SysinfoMemProbe;

use crate::wire::MemReport;
use std::fmt;
use std::io;

/// Result type for probe sampling.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors raised while querying the OS.
#[derive(Debug)]
pub enum ProbeError {
    /// The underlying syscall or file read failed.
    Io(io::Error),
    /// The statistics source was readable but not in the expected shape.
    Malformed(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "probe I/O error: {}", e),
            Self::Malformed(what) => write!(f, "malformed statistics source: {}", what),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Malformed(_) => None,
        }
    }
}

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Source of physical-memory counters.
pub trait MemProbe: Send + Sync + 'static {
    /// Total and free RAM in kilobytes.
    fn sample(&self) -> ProbeResult<MemReport>;
}

/// Source of cumulative CPU-time counters.
pub trait CpuProbe: Send + Sync + 'static {
    /// One snapshot of the aggregate jiffy counters.
    fn sample(&self) -> ProbeResult<CpuTimes>;
}

/// Memory probe returning a fixed report. For tests and demos.
pub struct FixedMemProbe(pub MemReport);

impl MemProbe for FixedMemProbe {
    fn sample(&self) -> ProbeResult<MemReport> {
        Ok(self.0)
    }
}

/// Memory probe that always fails, exercising the no-response error path.
pub struct FailingMemProbe;

impl MemProbe for FailingMemProbe {
    fn sample(&self) -> ProbeResult<MemReport> {
        Err(ProbeError::Io(io::Error::new(
            io::ErrorKind::Other,
            "probe disabled",
        )))
    }
}

/// CPU probe replaying a scripted sequence of snapshots; the last one
/// repeats once the script runs out. For tests and demos.
pub struct SequenceCpuProbe {
    snapshots: parking_lot::Mutex<std::collections::VecDeque<CpuTimes>>,
    last: parking_lot::Mutex<Option<CpuTimes>>,
}

impl SequenceCpuProbe {
    pub fn new(snapshots: impl IntoIterator<Item = CpuTimes>) -> Self {
        Self {
            snapshots: parking_lot::Mutex::new(snapshots.into_iter().collect()),
            last: parking_lot::Mutex::new(None),
        }
    }
}

impl CpuProbe for SequenceCpuProbe {
    fn sample(&self) -> ProbeResult<CpuTimes> {
        let mut queue = self.snapshots.lock();
        match queue.pop_front() {
            Some(times) => {
                *self.last.lock() = Some(times);
                Ok(times)
            }
            None => {
                let last = *self.last.lock();
                last.ok_or_else(|| ProbeError::Malformed("empty snapshot script".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mem_probe_returns_its_report() {
        let probe = FixedMemProbe(MemReport {
            total_kb: 100,
            free_kb: 50,
        });
        let report = probe.sample().unwrap();
        assert_eq!(report.total_kb, 100);
        assert_eq!(report.free_kb, 50);
    }

    #[test]
    fn failing_mem_probe_errors() {
        assert!(FailingMemProbe.sample().is_err());
    }

    #[test]
    fn sequence_probe_replays_then_repeats() {
        let a = CpuTimes::new(1, 0, 0, 1);
        let b = CpuTimes::new(2, 0, 0, 2);
        let probe = SequenceCpuProbe::new([a, b]);

        assert_eq!(probe.sample().unwrap(), a);
        assert_eq!(probe.sample().unwrap(), b);
        // Script exhausted: the last snapshot repeats.
        assert_eq!(probe.sample().unwrap(), b);
    }

    #[test]
    fn empty_sequence_probe_errors() {
        let probe = SequenceCpuProbe::new([]);
        assert!(matches!(
            probe.sample().unwrap_err(),
            ProbeError::Malformed(_)
        ));
    }
}

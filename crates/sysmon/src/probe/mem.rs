// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Physical-memory counters via `sysinfo(2)`.

use super::{MemProbe, ProbeError, ProbeResult};
use crate::wire::MemReport;
use std::io;

/// Memory probe backed by the `sysinfo(2)` syscall.
///
/// `totalram`/`freeram` are reported in units of `mem_unit` bytes and
/// converted to kilobytes here.
pub struct SysinfoMemProbe;

impl MemProbe for SysinfoMemProbe {
    fn sample(&self) -> ProbeResult<MemReport> {
        // SAFETY: sysinfo(2) fills the struct on success; zeroed is a valid
        // initial value for every field.
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::sysinfo(&mut info) };
        if rc != 0 {
            return Err(ProbeError::Io(io::Error::last_os_error()));
        }

        let unit = if info.mem_unit == 0 {
            1
        } else {
            u64::from(info.mem_unit)
        };
        Ok(MemReport {
            total_kb: (info.totalram as u64 * unit / 1024) as i64,
            free_kb: (info.freeram as u64 * unit / 1024) as i64,
        })
    }
}

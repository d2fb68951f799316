// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire formats of the two method payloads.
//!
//! Both are fixed-size, host-endian byte blobs with no header and no
//! versioning - the layout the legacy peers expect. Decoding demands the
//! exact length; anything else is rejected without interpreting a single
//! byte.

use std::fmt;
use svcbus::Payload;

/// Result type for payload decoding.
pub type WireResult<T> = Result<T, WireError>;

/// Payload decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Payload length differs from the fixed size of the expected struct.
    UnexpectedSize { expected: usize, actual: usize },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedSize { expected, actual } => write!(
                f,
                "unexpected payload size: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for WireError {}

/// Memory counters in kilobytes: two signed 64-bit integers, 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemReport {
    pub total_kb: i64,
    pub free_kb: i64,
}

impl MemReport {
    /// Encoded size: two `i64` fields.
    pub const WIRE_SIZE: usize = 16;

    pub fn encode(&self) -> Payload {
        let mut buf = Vec::with_capacity(Self::WIRE_SIZE);
        buf.extend_from_slice(&self.total_kb.to_ne_bytes());
        buf.extend_from_slice(&self.free_kb.to_ne_bytes());
        Payload::from(buf)
    }

    pub fn decode(payload: &Payload) -> WireResult<Self> {
        let data = payload.data();
        if data.len() != Self::WIRE_SIZE {
            return Err(WireError::UnexpectedSize {
                expected: Self::WIRE_SIZE,
                actual: data.len(),
            });
        }
        let mut total = [0u8; 8];
        let mut free = [0u8; 8];
        total.copy_from_slice(&data[0..8]);
        free.copy_from_slice(&data[8..16]);
        Ok(Self {
            total_kb: i64::from_ne_bytes(total),
            free_kb: i64::from_ne_bytes(free),
        })
    }
}

/// CPU utilization percentage: one raw IEEE-754 double, 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuReport {
    pub percent: f64,
}

impl CpuReport {
    /// Encoded size: one `f64`.
    pub const WIRE_SIZE: usize = 8;

    pub fn encode(&self) -> Payload {
        Payload::from(&self.percent.to_ne_bytes()[..])
    }

    pub fn decode(payload: &Payload) -> WireResult<Self> {
        let data = payload.data();
        if data.len() != Self::WIRE_SIZE {
            return Err(WireError::UnexpectedSize {
                expected: Self::WIRE_SIZE,
                actual: data.len(),
            });
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(data);
        Ok(Self {
            percent: f64::from_ne_bytes(raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_report_is_sixteen_bytes() {
        let report = MemReport {
            total_kb: 16384,
            free_kb: 8192,
        };
        let payload = report.encode();
        assert_eq!(payload.len(), MemReport::WIRE_SIZE);
        assert_eq!(MemReport::decode(&payload).unwrap(), report);
    }

    #[test]
    fn cpu_report_is_eight_bytes() {
        let report = CpuReport { percent: 42.5 };
        let payload = report.encode();
        assert_eq!(payload.len(), CpuReport::WIRE_SIZE);
        assert_eq!(CpuReport::decode(&payload).unwrap(), report);
    }

    #[test]
    fn short_payload_is_rejected_unread() {
        let err = MemReport::decode(&Payload::from(vec![1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            WireError::UnexpectedSize {
                expected: 16,
                actual: 3
            }
        );

        let err = CpuReport::decode(&Payload::empty()).unwrap_err();
        assert_eq!(
            err,
            WireError::UnexpectedSize {
                expected: 8,
                actual: 0
            }
        );
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let err = CpuReport::decode(&Payload::from(vec![0u8; 9])).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedSize { actual: 9, .. }));
    }

    #[test]
    fn negative_values_survive_the_wire() {
        // The format is signed on purpose; make sure sign bits round-trip.
        let report = MemReport {
            total_kb: -1,
            free_kb: i64::MIN,
        };
        assert_eq!(MemReport::decode(&report.encode()).unwrap(), report);
    }
}

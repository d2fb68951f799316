// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # sysmon - system-monitor demo applications
//!
//! Two thin applications over [`svcbus`]:
//!
//! - [`MonitorService`] offers a memory-info method and a CPU-usage method
//!   under fixed service addresses and answers each request from the local
//!   system (via `sysinfo(2)` and `/proc/stat`).
//! - [`MonitorClient`] requests both services, sends fire-and-forget method
//!   calls on console command, and prints whichever responses arrive.
//!
//! The wire formats are deliberately primitive - fixed-size, host-endian
//! byte blobs with no versioning - matching the legacy protocol this demo
//! speaks. See [`wire`].

pub mod client;
pub mod config;
pub mod ids;
pub mod probe;
pub mod service;
pub mod wire;

pub use client::{Command, MonitorClient, ReportSink};
pub use service::MonitorService;
pub use wire::{CpuReport, MemReport, WireError};

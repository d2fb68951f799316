// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end scenarios: client and service wired over one bus.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use svcbus::Bus;
use sysmon::probe::{CpuTimes, FixedMemProbe, SequenceCpuProbe};
use sysmon::{Command, CpuReport, MemReport, MonitorClient, MonitorService, ReportSink};

/// Sink forwarding decoded reports, with arrival timestamps, to channels.
struct RecordingSink {
    mem: mpsc::Sender<MemReport>,
    cpu: mpsc::Sender<(Instant, CpuReport)>,
}

impl ReportSink for RecordingSink {
    fn memory(&self, report: &MemReport) {
        self.mem.send(*report).unwrap();
    }

    fn cpu(&self, report: &CpuReport) {
        self.cpu.send((Instant::now(), *report)).unwrap();
    }
}

fn recording_sink() -> (
    Arc<RecordingSink>,
    mpsc::Receiver<MemReport>,
    mpsc::Receiver<(Instant, CpuReport)>,
) {
    let (mem_tx, mem_rx) = mpsc::channel();
    let (cpu_tx, cpu_rx) = mpsc::channel();
    (
        Arc::new(RecordingSink {
            mem: mem_tx,
            cpu: cpu_tx,
        }),
        mem_rx,
        cpu_rx,
    )
}

#[test]
fn memory_request_prints_the_service_counters() {
    let bus = Bus::new();
    let service = MonitorService::start(
        &bus,
        Arc::new(FixedMemProbe(MemReport {
            total_kb: 16384,
            free_kb: 8192,
        })),
        Arc::new(SequenceCpuProbe::new([CpuTimes::new(0, 0, 0, 0)])),
        Duration::from_millis(1),
    );

    let (sink, mem_rx, _cpu_rx) = recording_sink();
    let client = MonitorClient::with_sink(&bus, sink);

    client.submit(Command::Memory);

    let report = mem_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(report.total_kb, 16384);
    assert_eq!(report.free_kb, 8192);
    assert_eq!(client.pending_requests(), 0);

    client.shutdown();
    service.stop();
}

#[test]
fn quick_cpu_requests_are_processed_serially() {
    // Four scripted snapshots: the first request consumes the first two
    // (50% busy), the second request the last two (25% busy). Interleaved
    // processing would pair them differently and break the percentages.
    let snapshots = [
        CpuTimes::new(100, 0, 50, 850),   // total 1000
        CpuTimes::new(160, 0, 90, 950),   // total 1200 -> 50%
        CpuTimes::new(170, 0, 130, 1100), // total 1400
        CpuTimes::new(195, 0, 155, 1250), // total 1600 -> 25%
    ];
    let sample_window = Duration::from_millis(300);

    let bus = Bus::new();
    let service = MonitorService::start(
        &bus,
        Arc::new(FixedMemProbe(MemReport {
            total_kb: 1,
            free_kb: 1,
        })),
        Arc::new(SequenceCpuProbe::new(snapshots)),
        sample_window,
    );

    let (sink, _mem_rx, cpu_rx) = recording_sink();
    let client = MonitorClient::with_sink(&bus, sink);

    client.submit(Command::Cpu);
    client.submit(Command::Cpu);

    let (t1, first) = cpu_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let (t2, second) = cpu_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!((first.percent - 50.0).abs() < 1e-9);
    assert!((second.percent - 25.0).abs() < 1e-9);

    // Serial handling: the second response cannot complete until a full
    // sample window after the first one finished.
    assert!(t2.duration_since(t1) >= sample_window - Duration::from_millis(50));

    assert_eq!(service.requests_served(), 2);
    client.shutdown();
    service.stop();
}

#[test]
fn cpu_report_stays_within_percent_bounds() {
    let bus = Bus::new();
    let service = MonitorService::start(
        &bus,
        Arc::new(FixedMemProbe(MemReport {
            total_kb: 1,
            free_kb: 1,
        })),
        // Identical snapshots: zero total delta is defined to 0%.
        Arc::new(SequenceCpuProbe::new([CpuTimes::new(5, 5, 5, 5)])),
        Duration::from_millis(1),
    );

    let (sink, _mem_rx, cpu_rx) = recording_sink();
    let client = MonitorClient::with_sink(&bus, sink);

    client.submit(Command::Cpu);
    let (_, report) = cpu_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(report.percent >= 0.0);
    assert!(report.percent <= 100.0);
    assert_eq!(report.percent, 0.0);

    client.shutdown();
    service.stop();
}

#[test]
fn late_service_start_flips_availability_and_answers() {
    let bus = Bus::new();

    let (sink, mem_rx, _cpu_rx) = recording_sink();
    let client = MonitorClient::with_sink(&bus, sink);

    // Nothing offered yet: the request is dropped by the bus and the
    // client keeps it pending (no timeout, by design).
    client.submit(Command::Memory);
    assert!(mem_rx.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(client.pending_requests(), 1);

    let service = MonitorService::start(
        &bus,
        Arc::new(FixedMemProbe(MemReport {
            total_kb: 2048,
            free_kb: 1024,
        })),
        Arc::new(SequenceCpuProbe::new([CpuTimes::new(0, 0, 0, 0)])),
        Duration::from_millis(1),
    );

    // A new command after the service appeared succeeds; the earlier
    // request stays unanswered forever.
    client.submit(Command::Memory);
    let report = mem_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(report.total_kb, 2048);
    assert_eq!(client.pending_requests(), 1);

    client.shutdown();
    service.stop();
}

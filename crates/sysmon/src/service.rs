// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The monitoring service: offers the memory-info and CPU-usage methods
//! and answers each request from the local system.

use crate::config;
use crate::ids;
use crate::probe::{CpuProbe, CpuTimes, MemProbe, ProcStatProbe, SysinfoMemProbe};
use crate::wire::CpuReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use svcbus::{Application, Bus, Message};

/// Service endpoint offering both monitoring methods.
///
/// Both handlers run on the application's single dispatch thread. The CPU
/// handler sleeps for the sample window between its two jiffy snapshots,
/// which serializes every request to this application for that duration -
/// behavioral parity with the legacy service, kept deliberately.
///
/// Error policy: if an OS query fails the handler logs and sends no
/// response at all; the requester is left waiting.
pub struct MonitorService {
    app: Application,
    requests_served: Arc<AtomicU64>,
}

impl MonitorService {
    /// Start with the real probes and the configured CPU sample window.
    pub fn with_defaults(bus: &Bus) -> Self {
        Self::start(
            bus,
            Arc::new(SysinfoMemProbe),
            Arc::new(ProcStatProbe::new()),
            config::cpu_sample_interval(),
        )
    }

    /// Start with explicit probes and sample window.
    pub fn start(
        bus: &Bus,
        mem: Arc<dyn MemProbe>,
        cpu: Arc<dyn CpuProbe>,
        cpu_sample: Duration,
    ) -> Self {
        let app = bus.create_application("sysmon-service");
        let requests_served = Arc::new(AtomicU64::new(0));

        let served = requests_served.clone();
        app.register_message_handler(ids::MEM_METHOD, move |app, request| {
            log::info!("client [{:04x}] requested memory usage", request.source);

            let report = match mem.sample() {
                Ok(report) => report,
                Err(e) => {
                    // No response on failure; the requester keeps waiting.
                    log::error!("unable to fetch memory usage: {}", e);
                    return;
                }
            };

            let response = Message::response(request).with_payload(report.encode());
            if let Err(e) = app.send(response) {
                log::error!("failed to send memory response: {}", e);
                return;
            }
            served.fetch_add(1, Ordering::Relaxed);
            log::debug!("memory request {} processed", request.id);
        });

        let served = requests_served.clone();
        app.register_message_handler(ids::CPU_METHOD, move |app, request| {
            log::info!("client [{:04x}] requested CPU usage", request.source);

            let first = match cpu.sample() {
                Ok(times) => times,
                Err(e) => {
                    log::error!("unable to read CPU counters: {}", e);
                    return;
                }
            };

            // Blocks the dispatch thread for the whole sample window, so
            // concurrent CPU requests are processed strictly one after
            // the other.
            thread::sleep(cpu_sample);

            let second = match cpu.sample() {
                Ok(times) => times,
                Err(e) => {
                    log::error!("unable to read CPU counters: {}", e);
                    return;
                }
            };

            let percent = CpuTimes::usage_between(&first, &second);
            let response = Message::response(request).with_payload(CpuReport { percent }.encode());
            if let Err(e) = app.send(response) {
                log::error!("failed to send CPU response: {}", e);
                return;
            }
            served.fetch_add(1, Ordering::Relaxed);
            log::debug!("cpu request {} processed ({:.1}%)", request.id, percent);
        });

        app.offer_service(ids::MEM_SERVICE);
        app.offer_service(ids::CPU_SERVICE);
        app.start();

        Self {
            app,
            requests_served,
        }
    }

    /// Number of requests answered so far.
    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    /// Withdraw both offers and stop the dispatch thread.
    pub fn stop(&self) {
        self.app.stop();
    }
}
